//! Completion trigger detection
//!
//! The detector works on the raw characters and the cursor, not on tokens:
//! whether a trigger is live depends on context the lexer does not track
//! (quoting up to the candidate position, whitespace adjacency).
//!
//! Evaluation order, first match wins:
//! 1. `@` entity trigger (any mode)
//! 2. slash command (any mode)
//! 3. command name (shell mode)
//! 4. argument / file trigger (shell mode), reported as `Entity`

use std::ops::Range;

use serde::Serialize;
use tracing::trace;

use crate::parser::quote_state_at;
use crate::repl::input_state::{InputMode, InputState};

/// Kind of completion a trigger asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    #[default]
    None,
    Entity,
    SlashCommand,
    Command,
}

/// Result of trigger detection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TriggerResult {
    pub triggered: bool,
    pub kind: TriggerKind,
    /// Index of the trigger character, or of the first character of the
    /// completed word when there is no trigger character
    pub position: Option<usize>,
    /// Filter text after the trigger character
    pub prefix: String,
}

impl TriggerResult {
    /// The "no completion" result
    pub fn none() -> Self {
        Self::default()
    }

    fn new(kind: TriggerKind, position: usize, prefix: &[char]) -> Self {
        Self {
            triggered: true,
            kind,
            position: Some(position),
            prefix: prefix.iter().collect(),
        }
    }

    /// Character range an accepted completion replaces: the prefix up to the cursor
    pub fn replace_range(&self, cursor: usize) -> Option<Range<usize>> {
        if !self.triggered {
            return None;
        }
        let start = cursor.saturating_sub(self.prefix.chars().count());
        Some(start..cursor)
    }
}

/// Detect which completion, if any, the cursor position activates
pub fn detect_trigger(state: &InputState) -> TriggerResult {
    let chars = state.chars();
    let cursor = state.cursor_pos.min(chars.len());

    let result = detect_entity(&chars, cursor)
        .or_else(|| detect_slash(&chars, cursor))
        .or_else(|| {
            if state.mode != InputMode::Shell {
                return None;
            }
            detect_command(&chars, cursor).or_else(|| detect_argument(&chars, cursor))
        })
        .unwrap_or_else(TriggerResult::none);

    trace!(
        "trigger for {:?}@{}: {:?} {:?}",
        state.raw_text, cursor, result.kind, result.prefix
    );
    result
}

/// Bounds of the first whitespace-delimited word
fn first_token_bounds(chars: &[char]) -> Option<(usize, usize)> {
    let start = chars.iter().position(|c| !c.is_whitespace())?;
    let end = chars[start..]
        .iter()
        .position(|c| c.is_whitespace())
        .map(|offset| start + offset)
        .unwrap_or(chars.len());
    Some((start, end))
}

fn detect_entity(chars: &[char], cursor: usize) -> Option<TriggerResult> {
    let at = (0..cursor)
        .rev()
        .take_while(|&i| !chars[i].is_whitespace())
        .find(|&i| chars[i] == '@')?;

    let standalone = at == 0 || chars[at - 1].is_whitespace();
    if !standalone || quote_state_at(chars, at).is_open() {
        return None;
    }

    Some(TriggerResult::new(
        TriggerKind::Entity,
        at,
        &chars[at + 1..cursor],
    ))
}

fn detect_slash(chars: &[char], cursor: usize) -> Option<TriggerResult> {
    if chars.first() != Some(&'/') {
        return None;
    }

    let first_end = chars
        .iter()
        .position(|c| c.is_whitespace())
        .unwrap_or(chars.len());
    if cursor > first_end {
        return None;
    }

    let prefix = if cursor > 1 { &chars[1..cursor] } else { &[][..] };
    Some(TriggerResult::new(TriggerKind::SlashCommand, 0, prefix))
}

fn detect_command(chars: &[char], cursor: usize) -> Option<TriggerResult> {
    let Some((start, end)) = first_token_bounds(chars) else {
        // Empty or whitespace-only line
        return Some(TriggerResult::new(TriggerKind::Command, cursor, &[]));
    };

    if cursor < start || cursor > end || chars[start] == '/' {
        return None;
    }

    Some(TriggerResult::new(
        TriggerKind::Command,
        start,
        &chars[start..cursor],
    ))
}

fn detect_argument(chars: &[char], cursor: usize) -> Option<TriggerResult> {
    let (_, first_end) = first_token_bounds(chars)?;
    if cursor <= first_end {
        return None;
    }

    // Mid-word: something other than whitespace follows the cursor
    if chars.get(cursor).is_some_and(|c| !c.is_whitespace()) {
        return None;
    }

    // Any whitespace ends the prefix, escaped or not: `cat my\ fi` completes `fi`
    let mut start = cursor;
    while start > first_end && !chars[start - 1].is_whitespace() {
        start -= 1;
    }

    Some(TriggerResult::new(
        TriggerKind::Entity,
        start,
        &chars[start..cursor],
    ))
}
