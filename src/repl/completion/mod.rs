//! Completion system
//!
//! Completion runs in three stages on every keystroke:
//!
//! - **Trigger**: decides from raw text and cursor whether a completion is
//!   live, what kind it is, and which prefix filters it
//! - **Completers**: pluggable sources that turn an input snapshot into
//!   candidates (slash commands, command names, files, git refs, `@` entities)
//! - **Manager**: queries the relevant completers concurrently and merges
//!   their results into one ranked list
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use promptline::repl::completion::{CompletionManager, CompletionOptions, SlashCompleter};
//! use promptline::repl::{InputMode, InputState};
//!
//! # async fn demo() {
//! let manager = CompletionManager::new();
//! manager.register_completer(Arc::new(SlashCompleter::new()));
//!
//! let state = InputState::tokenized("/he", 3, InputMode::Nl);
//! let ranked = manager.get_completions(&state, CompletionOptions::default()).await;
//! assert_eq!(ranked[0].value, "help");
//! # }
//! ```

pub mod candidate;
pub mod command;
pub mod completer;
pub mod entity;
pub mod file;
pub mod git_ref;
pub mod manager;
pub mod recency;
pub mod slash;
pub mod trigger;

pub use candidate::{Completion, CompletionGroup, prefix_score, rank_order};
pub use command::{CommandCategory, CommandCompleter};
pub use completer::Completer;
pub use entity::{Entity, EntityCompleter};
pub use file::FileCompleter;
pub use git_ref::GitRefCompleter;
pub use manager::{CompletionManager, CompletionOptions};
pub use recency::RecencyBoosted;
pub use slash::SlashCompleter;
pub use trigger::{TriggerKind, TriggerResult, detect_trigger};
