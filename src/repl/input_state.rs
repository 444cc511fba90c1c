//! Per-keystroke input snapshot
//!
//! An [`InputState`] is built fresh for every keystroke and never mutated in
//! place: [`InputState::update_with_tokens`] consumes a snapshot and returns
//! the enriched one. All positions are character indices.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::completion::trigger::{TriggerKind, TriggerResult, detect_trigger};
use crate::parser::{ShellLexer, Token};

/// What the user is typing into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Shell command line
    #[default]
    Shell,
    /// Internal slash-command
    Slash,
    /// Free-form natural-language chat
    Nl,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Shell => "shell",
            InputMode::Slash => "slash",
            InputMode::Nl => "nl",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shell" => Ok(InputMode::Shell),
            "slash" => Ok(InputMode::Slash),
            "nl" | "chat" => Ok(InputMode::Nl),
            other => Err(format!("unknown input mode: {other}")),
        }
    }
}

/// Immutable snapshot of the input line at one keystroke
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    pub raw_text: String,
    /// Cursor position, clamped to `[0, len]`
    pub cursor_pos: usize,
    pub text_before_cursor: String,
    pub text_after_cursor: String,
    pub mode: InputMode,
    /// Working directory used by path-based completers
    pub cwd: PathBuf,
    /// Recent commands, most recent first
    pub history: Vec<String>,

    /// Empty until tokenized
    pub tokens: Vec<Token>,
    /// Index of the rightmost token starting at or before the cursor
    pub token_index: Option<usize>,
    pub current_token: Option<Token>,
    /// Token text up to the cursor, sigil included (`@fi`, `/he`)
    pub prefix: String,
    pub is_slash_command: bool,
    /// True when the trigger detector found an active `@` trigger
    pub is_entity_trigger: bool,
    /// Trigger detector result; its prefix has the sigil stripped
    pub trigger: TriggerResult,
}

impl InputState {
    /// Create an untokenized snapshot
    ///
    /// Out-of-range cursor positions are clamped rather than rejected.
    pub fn new(raw_text: impl Into<String>, cursor_pos: usize, mode: InputMode) -> Self {
        let raw_text = raw_text.into();
        let len = raw_text.chars().count();
        let cursor_pos = cursor_pos.min(len);
        let text_before_cursor: String = raw_text.chars().take(cursor_pos).collect();
        let text_after_cursor: String = raw_text.chars().skip(cursor_pos).collect();
        let is_slash_command = raw_text.starts_with('/');

        Self {
            raw_text,
            cursor_pos,
            text_before_cursor,
            text_after_cursor,
            mode,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            history: Vec::new(),
            tokens: Vec::new(),
            token_index: None,
            current_token: None,
            prefix: String::new(),
            is_slash_command,
            is_entity_trigger: false,
            trigger: TriggerResult::none(),
        }
    }

    /// Create a snapshot and run the tokenizer and trigger passes on it
    pub fn tokenized(raw_text: impl Into<String>, cursor_pos: usize, mode: InputMode) -> Self {
        Self::new(raw_text, cursor_pos, mode).update_with_tokens()
    }

    /// Clamp a possibly negative cursor coming from a signed caller
    pub fn clamp_cursor(raw_text: &str, cursor_pos: i64) -> usize {
        let len = raw_text.chars().count() as i64;
        cursor_pos.clamp(0, len) as usize
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = cwd.as_ref().to_path_buf();
        self
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    /// Derive tokens, cursor mapping, prefix and trigger information
    pub fn update_with_tokens(self) -> Self {
        let tokens = ShellLexer::tokenize(&self.raw_text);
        let cursor = self.cursor_pos;

        let token_index = tokens.iter().rposition(|t| t.start() <= cursor);
        let current_token = token_index.and_then(|i| tokens.get(i)).cloned();
        let prefix = current_token
            .as_ref()
            .map(|t| t.value.chars().take(cursor - t.start()).collect())
            .unwrap_or_default();

        let mut next = Self {
            tokens,
            token_index,
            current_token,
            prefix,
            ..self
        };

        let trigger = detect_trigger(&next);
        next.is_entity_trigger = trigger.kind == TriggerKind::Entity
            && trigger
                .position
                .and_then(|p| next.raw_text.chars().nth(p))
                .is_some_and(|c| c == '@');
        next.trigger = trigger;
        next
    }

    /// Raw text as characters
    pub fn chars(&self) -> Vec<char> {
        self.raw_text.chars().collect()
    }

    /// Number of characters in the raw text
    pub fn len(&self) -> usize {
        self.raw_text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.is_empty()
    }

    /// First non-whitespace token, if any
    pub fn command_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| !t.is_whitespace())
    }

    /// Non-whitespace token values in order
    pub fn words(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| !t.is_whitespace())
            .map(|t| t.value.as_str())
            .collect()
    }
}
