//! Token model for the shell-style input line
//!
//! Tokens carry character-index spans into the raw line. A token stream
//! produced by [`ShellLexer`](super::ShellLexer) always tiles the whole input:
//! every character belongs to exactly one token.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// First non-whitespace token of the line
    Command,
    /// Word starting with `-`
    Option,
    /// Plain word
    Argument,
    /// Word starting with `/`, `./`, `../` or `~/`
    Path,
    /// Word starting with `@`
    Entity,
    /// Run of shell metacharacters (`|`, `&`, `;`, `<`, `>`, `(`, `)`)
    Operator,
    /// Quoted run including both delimiters
    String,
    /// Run of whitespace
    Whitespace,
}

impl TokenKind {
    /// Lowercase name used in diagnostics and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Command => "command",
            TokenKind::Option => "option",
            TokenKind::Argument => "argument",
            TokenKind::Path => "path",
            TokenKind::Entity => "entity",
            TokenKind::Operator => "operator",
            TokenKind::String => "string",
            TokenKind::Whitespace => "whitespace",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token with position information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Character range in the raw line
    pub span: Range<usize>,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
        }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Number of characters covered by this token
    pub fn len(&self) -> usize {
        self.span.end - self.span.start
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }
}
