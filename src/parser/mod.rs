//! Lexical analysis of the input line
//!
//! - `token`: token kinds and positioned tokens
//! - `quote`: the quote/escape scanner shared with the trigger detector
//! - `shell_lexer`: the shell-style tokenizer

pub mod quote;
pub mod shell_lexer;
pub mod token;

pub use quote::{QuoteState, QuoteTracker, find_string_end, quote_state_at};
pub use shell_lexer::ShellLexer;
pub use token::{Token, TokenKind};
