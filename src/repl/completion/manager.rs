//! Completion manager - registry and ranking of completers
//!
//! The manager owns an ordered registry of completers keyed by name. For each
//! keystroke it filters the registry down to the relevant completers, queries
//! them concurrently, and merges the results into one ranked list.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, warn};

use super::candidate::{Completion, rank_order};
use super::completer::Completer;
use crate::error::CompleterError;
use crate::repl::input_state::InputState;

/// Per-query options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Keep only the first N ranked candidates
    pub max_results: Option<usize>,
}

impl CompletionOptions {
    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            max_results: Some(max_results),
        }
    }
}

/// Registry of completers
#[derive(Default)]
pub struct CompletionManager {
    completers: RwLock<Vec<Arc<dyn Completer>>>,
}

impl CompletionManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn Completer>>> {
        match self.completers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<dyn Completer>>> {
        match self.completers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a completer
    ///
    /// Registration is idempotent by name: if a completer with the same name
    /// is already present the call is a no-op and returns false.
    pub fn register_completer(&self, completer: Arc<dyn Completer>) -> bool {
        let mut completers = self.write();
        if completers.iter().any(|c| c.name() == completer.name()) {
            debug!("Completer '{}' already registered", completer.name());
            return false;
        }
        debug!("Registering completer '{}'", completer.name());
        completers.push(completer);
        true
    }

    /// Remove a completer by name, returning whether one was removed
    pub fn unregister_completer(&self, name: &str) -> bool {
        let mut completers = self.write();
        let before = completers.len();
        completers.retain(|c| c.name() != name);
        completers.len() != before
    }

    /// Registered completers in registration order
    pub fn get_completers(&self) -> Vec<Arc<dyn Completer>> {
        self.read().clone()
    }

    /// Query all relevant completers and return the ranked, merged list
    ///
    /// Relevant completers run concurrently and are all awaited. A completer
    /// that fails or panics contributes nothing; the others still count.
    /// The merge is a stable sort by group, then score descending, with no
    /// de-duplication.
    pub async fn get_completions(
        &self,
        state: &InputState,
        options: CompletionOptions,
    ) -> Vec<Completion> {
        let relevant: Vec<Arc<dyn Completer>> = self
            .read()
            .iter()
            .filter(|c| c.is_relevant(state))
            .cloned()
            .collect();

        debug!(
            "Querying {} completer(s) for {:?}",
            relevant.len(),
            state.raw_text
        );

        let queries = relevant.iter().map(|completer| async move {
            let name = completer.name();
            match AssertUnwindSafe(completer.get_completions(state))
                .catch_unwind()
                .await
            {
                Ok(Ok(list)) => {
                    debug!("Completer '{}' returned {} candidate(s)", name, list.len());
                    list
                }
                Ok(Err(e)) => {
                    warn!("Completer '{}' failed: {}", name, e);
                    Vec::new()
                }
                Err(_) => {
                    let err = CompleterError::Panicked {
                        completer: name.to_string(),
                    };
                    warn!("{}", err);
                    Vec::new()
                }
            }
        });

        let mut merged: Vec<Completion> = join_all(queries).await.into_iter().flatten().collect();
        merged.sort_by(rank_order);

        if let Some(max) = options.max_results {
            merged.truncate(max);
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PromptlineError, Result};
    use crate::repl::completion::candidate::CompletionGroup;
    use crate::repl::input_state::InputMode;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StaticCompleter {
        name: String,
        items: Vec<Completion>,
        relevant: bool,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl StaticCompleter {
        fn new(name: &str, items: Vec<Completion>) -> Self {
            Self {
                name: name.to_string(),
                items,
                relevant: true,
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn irrelevant(mut self) -> Self {
            self.relevant = false;
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl Completer for StaticCompleter {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_relevant(&self, _state: &InputState) -> bool {
            self.relevant
        }

        async fn get_completions(&self, _state: &InputState) -> Result<Vec<Completion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.items.clone())
        }
    }

    struct FailingCompleter;

    #[async_trait]
    impl Completer for FailingCompleter {
        fn name(&self) -> &str {
            "failing"
        }

        fn is_relevant(&self, _state: &InputState) -> bool {
            true
        }

        async fn get_completions(&self, _state: &InputState) -> Result<Vec<Completion>> {
            Err(PromptlineError::Generic("source offline".to_string()))
        }
    }

    struct PanickingCompleter;

    #[async_trait]
    impl Completer for PanickingCompleter {
        fn name(&self) -> &str {
            "panicking"
        }

        fn is_relevant(&self, _state: &InputState) -> bool {
            true
        }

        async fn get_completions(&self, _state: &InputState) -> Result<Vec<Completion>> {
            panic!("completer bug");
        }
    }

    fn item(value: &str, group: CompletionGroup, score: f64) -> Completion {
        Completion::new(value, group, score, "test")
    }

    fn state() -> InputState {
        InputState::tokenized("g", 1, InputMode::Shell)
    }

    #[test]
    fn test_register_is_idempotent_by_name() {
        let manager = CompletionManager::new();
        let first = Arc::new(StaticCompleter::new(
            "dup",
            vec![item("first", CompletionGroup::Other, 1.0)],
        ));
        let second = Arc::new(StaticCompleter::new(
            "dup",
            vec![item("second", CompletionGroup::Other, 1.0)],
        ));

        assert!(manager.register_completer(first));
        assert!(!manager.register_completer(second));
        assert_eq!(manager.get_completers().len(), 1);

        let results = tokio_test::block_on(manager.get_completions(&state(), Default::default()));
        assert_eq!(results[0].value, "first");
    }

    #[test]
    fn test_unregister() {
        let manager = CompletionManager::new();
        manager.register_completer(Arc::new(StaticCompleter::new("a", vec![])));
        manager.register_completer(Arc::new(StaticCompleter::new("b", vec![])));

        assert!(manager.unregister_completer("a"));
        assert!(!manager.unregister_completer("a"));
        let names: Vec<String> = manager
            .get_completers()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["b"]);
    }

    #[tokio::test]
    async fn test_irrelevant_completer_is_never_queried() {
        let manager = CompletionManager::new();
        let skipped = Arc::new(
            StaticCompleter::new("skipped", vec![item("x", CompletionGroup::Other, 1.0)])
                .irrelevant(),
        );
        manager.register_completer(skipped.clone());

        let results = manager.get_completions(&state(), Default::default()).await;
        assert!(results.is_empty());
        assert_eq!(skipped.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_group_then_score_ordering() {
        let manager = CompletionManager::new();
        manager.register_completer(Arc::new(StaticCompleter::new(
            "others",
            vec![item("gitk", CompletionGroup::OtherCommand, 95.0)],
        )));
        manager.register_completer(Arc::new(StaticCompleter::new(
            "recommended",
            vec![
                item("gcc", CompletionGroup::RecommendedCommand, 60.0),
                item("git", CompletionGroup::RecommendedCommand, 80.0),
            ],
        )));

        let results = manager.get_completions(&state(), Default::default()).await;
        let values: Vec<&str> = results.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["git", "gcc", "gitk"]);
    }

    #[tokio::test]
    async fn test_no_deduplication_and_stable_ties() {
        let manager = CompletionManager::new();
        manager.register_completer(Arc::new(StaticCompleter::new(
            "one",
            vec![item("same", CompletionGroup::File, 10.0)],
        )));
        manager.register_completer(Arc::new(StaticCompleter::new(
            "two",
            vec![Completion::new("same", CompletionGroup::File, 10.0, "second")],
        )));

        let results = manager.get_completions(&state(), Default::default()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "test");
        assert_eq!(results[1].source, "second");
    }

    #[tokio::test]
    async fn test_max_results_keeps_best() {
        let manager = CompletionManager::new();
        let items: Vec<Completion> = (0..100)
            .map(|i| item(&format!("c{i}"), CompletionGroup::Other, i as f64))
            .collect();
        manager.register_completer(Arc::new(StaticCompleter::new("many", items)));

        let results = manager
            .get_completions(&state(), CompletionOptions::with_max_results(10))
            .await;
        assert_eq!(results.len(), 10);
        assert_eq!(results[0].value, "c99");
        assert_eq!(results[9].value, "c90");
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let manager = CompletionManager::new();
        manager.register_completer(Arc::new(FailingCompleter));
        manager.register_completer(Arc::new(PanickingCompleter));
        manager.register_completer(Arc::new(StaticCompleter::new(
            "healthy",
            vec![item("ok", CompletionGroup::Other, 1.0)],
        )));

        let results = manager.get_completions(&state(), Default::default()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_completers_run_concurrently() {
        let manager = CompletionManager::new();
        for name in ["slow-a", "slow-b", "slow-c"] {
            manager.register_completer(Arc::new(
                StaticCompleter::new(name, vec![item(name, CompletionGroup::Other, 1.0)])
                    .delayed(Duration::from_millis(100)),
            ));
        }

        let started = tokio::time::Instant::now();
        let results = manager.get_completions(&state(), Default::default()).await;
        assert_eq!(results.len(), 3);
        assert!(started.elapsed() < Duration::from_millis(200));
    }
}
