//! Internal slash-command completer

use async_trait::async_trait;

use super::candidate::{Completion, CompletionGroup, prefix_score};
use super::completer::Completer;
use crate::error::Result;
use crate::repl::input_state::{InputMode, InputState};

/// Built-in slash commands and their descriptions
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("help", "Show available commands"),
    ("clear", "Clear the screen"),
    ("exit", "Exit the session"),
    ("quit", "Exit the session"),
    ("mode", "Switch input mode (shell, nl)"),
    ("history", "Show recent commands"),
    ("reset", "Reset the conversation"),
    ("config", "Show or edit configuration"),
    ("model", "Select the model"),
    ("cwd", "Show the working directory"),
];

/// Completes `/name` commands from a fixed catalog
pub struct SlashCompleter {
    commands: Vec<(String, String)>,
}

impl SlashCompleter {
    pub const NAME: &'static str = "slash";

    pub fn new() -> Self {
        Self::with_commands(
            SLASH_COMMANDS
                .iter()
                .map(|(name, desc)| (name.to_string(), desc.to_string())),
        )
    }

    /// Build a completer over a custom catalog of `(name, description)` pairs
    pub fn with_commands(commands: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    /// Catalog names
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for SlashCompleter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Completer for SlashCompleter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &InputState) -> bool {
        state.mode == InputMode::Slash || state.raw_text.starts_with('/')
    }

    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>> {
        // Only the command word itself completes; arguments are free text
        let on_command = match (state.token_index, state.command_token()) {
            (Some(index), Some(command)) => state.tokens[index].span == command.span,
            _ => true,
        };
        if !on_command {
            return Ok(Vec::new());
        }

        let prefix = state.prefix.strip_prefix('/').unwrap_or(&state.prefix);

        let completions = self
            .commands
            .iter()
            .filter_map(|(name, description)| {
                let score = prefix_score(name, prefix);
                if score <= 0.0 {
                    return None;
                }
                Some(
                    Completion::new(name, CompletionGroup::InternalCommand, score, Self::NAME)
                        .with_display(format!("/{name}"))
                        .with_description(description),
                )
            })
            .collect();

        Ok(completions)
    }
}
