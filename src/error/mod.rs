//! Error handling for promptline
//!
//! The input engine never fails on user input: malformed
//! quoting, out-of-range cursors and misbehaving completers are all absorbed.
//! Errors surface only at the edges (configuration, I/O, completer sources).
//!
//! # Example
//!
//! ```rust,no_run
//! use promptline::error::{Result, PromptlineError};
//!
//! fn load() -> Result<()> {
//!     Err(PromptlineError::Generic("not today".into()))
//! }
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CompleterError, ConfigError, PromptlineError, Result};
