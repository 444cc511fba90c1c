//! Promptline Library
//!
//! Keystroke-level input engine for terminal clients: a shell-aware
//! tokenizer, a context-sensitive completion trigger detector, pluggable
//! completers with ranked results, and a scrolling completion menu.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `parser`: Shell-style tokenizer and quote scanning
//! - `repl`: Input engine, completion and menu
//!
//! # Example
//!
//! ```no_run
//! use promptline::{Config, InputEngine, repl::InputMode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = InputEngine::with_defaults(&Config::default(), ".");
//!
//!     engine.update_completions("gi", 2, InputMode::Shell).await;
//!     if let Some(top) = engine.selected() {
//!         println!("best match: {}", top.value);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use error::{PromptlineError, Result};
pub use parser::{ShellLexer, Token, TokenKind};
pub use repl::{InputEngine, InputMode, InputState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
