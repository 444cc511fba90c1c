//! Pluggable completion strategy
//!
//! Each completer maps an [`InputState`] to a list of candidates. The
//! [`CompletionManager`](super::CompletionManager) asks every registered
//! completer whether it is relevant before querying it, so completers that
//! perform I/O are never invoked for inputs they cannot serve.

use async_trait::async_trait;

use super::candidate::Completion;
use crate::error::Result;
use crate::repl::input_state::InputState;

/// Trait implemented by every completion source
#[async_trait]
pub trait Completer: Send + Sync {
    /// Unique registry name
    fn name(&self) -> &str;

    /// Whether this completer has anything to say about `state`
    ///
    /// Must be cheap: it runs for every registered completer on every keystroke.
    fn is_relevant(&self, state: &InputState) -> bool;

    /// Produce candidates for `state`
    ///
    /// Only called when [`is_relevant`](Self::is_relevant) returned true.
    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>>;
}
