//! Shell-style lexer for error-tolerant tokenization
//!
//! This lexer classifies a command line for display and completion
//! triggering. It is not a shell grammar: there is no expansion, no
//! here-doc handling and no command substitution.
//!
//! # Design Principles
//!
//! - **Never panic** - always return a valid token stream
//! - **Never reject input** - malformed quoting becomes a `String` token that
//!   runs to the end of the line
//! - **Total coverage** - tokens tile the input exactly, whitespace included
//! - **Performance** - simple character-by-character scanning

use super::quote::{find_string_end, is_quote};
use super::token::{Token, TokenKind};

/// Shell metacharacters grouped into `Operator` tokens
const OPERATOR_CHARS: &[char] = &['|', '&', ';', '<', '>', '(', ')'];

/// Returns true for characters that form operator runs
pub fn is_operator_char(ch: char) -> bool {
    OPERATOR_CHARS.contains(&ch)
}

/// Shell lexer
pub struct ShellLexer {
    input: Vec<char>,
    pos: usize,
    seen_command: bool,
}

impl ShellLexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            seen_command: false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Self::new(input);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token() {
            tokens.push(token);
        }

        tokens
    }

    /// Get the next token, or `None` at end of input
    fn next_token(&mut self) -> Option<Token> {
        if self.is_at_end() {
            return None;
        }

        let start = self.pos;
        let ch = self.current_char();

        if ch.is_whitespace() {
            self.skip_whitespace();
            return Some(self.make_token(TokenKind::Whitespace, start));
        }

        let lexical = if is_quote(ch) {
            self.pos = find_string_end(&self.input, start);
            TokenKind::String
        } else if is_operator_char(ch) {
            self.read_operator();
            TokenKind::Operator
        } else {
            self.read_word();
            self.classify_word(start)
        };

        // The first non-whitespace token always names the command
        let kind = if self.seen_command {
            lexical
        } else {
            self.seen_command = true;
            TokenKind::Command
        };

        Some(self.make_token(kind, start))
    }

    fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        let value: String = self.input[start..self.pos].iter().collect();
        Token::new(kind, value, start..self.pos)
    }

    /// Classify a word that is not the command
    fn classify_word(&self, start: usize) -> TokenKind {
        let word = &self.input[start..self.pos];

        match word {
            ['-', ..] => TokenKind::Option,
            ['@', ..] => TokenKind::Entity,
            ['/', ..] | ['.', '/', ..] | ['.', '.', '/', ..] | ['~', '/', ..] => TokenKind::Path,
            _ => TokenKind::Argument,
        }
    }

    /// Read a word: everything up to whitespace, a quote or an operator.
    /// A backslash keeps the following character inside the word.
    fn read_word(&mut self) {
        while !self.is_at_end() {
            let ch = self.current_char();
            if ch == '\\' {
                self.advance();
                if !self.is_at_end() {
                    self.advance();
                }
                continue;
            }
            if ch.is_whitespace() || is_quote(ch) || is_operator_char(ch) {
                break;
            }
            self.advance();
        }
    }

    fn read_operator(&mut self) {
        while !self.is_at_end() && is_operator_char(self.current_char()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn current_char(&self) -> char {
        self.input[self.pos]
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}
