//! Interactive input engine
//!
//! This module turns the line being typed into:
//! - a classified token stream for highlighting
//! - a trigger telling which kind of completion the cursor asks for
//! - a ranked, navigable completion menu
//!
//! The outer line editor drives everything through [`InputEngine`]: it calls
//! [`InputEngine::update_completions`] on every edit, routes menu keys to
//! [`InputEngine::handle_keypress`] and writes the output of
//! [`InputEngine::render_menu`] to the terminal.

pub mod completion;
pub mod engine;
pub mod highlighter;
pub mod history;
pub mod input_state;
pub mod keys;
pub mod menu;
pub mod renderer;

pub use completion::{
    Completer, Completion, CompletionGroup, CompletionManager, CompletionOptions, TriggerKind,
    TriggerResult,
};
pub use engine::{InputEngine, UpdateOutcome};
pub use highlighter::{AnsiStyler, PlainStyler, StyleKind, Styler, TokenHighlighter};
pub use history::{HistoryEntry, HistoryLimits, HistoryProvider};
pub use input_state::{InputMode, InputState};
pub use keys::{Key, KeyHandler, KeyOutcome, Modifiers};
pub use menu::CompletionMenu;
pub use renderer::{MenuRenderer, visible_window};
