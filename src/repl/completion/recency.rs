//! Recency boosting for any completer

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::candidate::{Completion, CompletionGroup};
use super::completer::Completer;
use crate::error::Result;
use crate::repl::history::{HistoryEntry, HistoryProvider};
use crate::repl::input_state::InputState;

/// How many recent commands are consulted per query
pub const DEFAULT_RECENCY_WINDOW: usize = 200;

/// Usage of one value across the recent history
#[derive(Debug, Clone, Copy)]
struct Usage {
    count: usize,
    last_used: DateTime<Utc>,
}

/// Frequency and recency combined
///
/// Values used within the last hour weigh eight times more than values last
/// used over a week ago.
pub fn frecency_score(use_count: usize, last_used: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - last_used).num_seconds().max(0) as f64 / 3600.0;
    let recency_weight = if age_hours < 1.0 {
        8.0
    } else if age_hours < 24.0 {
        4.0
    } else if age_hours < 168.0 {
        2.0
    } else {
        1.0
    };
    (use_count as f64).ln_1p() * recency_weight
}

fn is_command_group(group: CompletionGroup) -> bool {
    matches!(
        group,
        CompletionGroup::Builtin | CompletionGroup::RecommendedCommand | CompletionGroup::OtherCommand
    )
}

fn record<'a>(map: &mut HashMap<&'a str, Usage>, key: &'a str, timestamp: DateTime<Utc>) {
    let usage = map.entry(key).or_insert(Usage {
        count: 0,
        last_used: timestamp,
    });
    usage.count += 1;
    usage.last_used = usage.last_used.max(timestamp);
}

/// Tally how often each word was used, and separately each program name
fn tally(entries: &[HistoryEntry]) -> (HashMap<&str, Usage>, HashMap<&str, Usage>) {
    let mut programs: HashMap<&str, Usage> = HashMap::new();
    let mut words: HashMap<&str, Usage> = HashMap::new();

    for entry in entries {
        if let Some(program) = entry.program() {
            record(&mut programs, program, entry.timestamp);
        }
        for word in entry.command.split_whitespace() {
            record(&mut words, word, entry.timestamp);
        }
    }
    (programs, words)
}

/// Wraps a completer and boosts candidates seen in recent history
///
/// Command candidates match the first word of a recent command; anything
/// else matches any word. The single best recency match is promoted to
/// [`CompletionGroup::TopSuggestion`].
pub struct RecencyBoosted<C> {
    inner: C,
    history: Arc<HistoryProvider>,
    window: usize,
}

impl<C: Completer> RecencyBoosted<C> {
    pub fn new(inner: C, history: Arc<HistoryProvider>) -> Self {
        Self {
            inner,
            history,
            window: DEFAULT_RECENCY_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: Completer> Completer for RecencyBoosted<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_relevant(&self, state: &InputState) -> bool {
        self.inner.is_relevant(state)
    }

    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>> {
        let mut completions = self.inner.get_completions(state).await?;

        let recent = self.history.get_recent(self.window);
        if recent.is_empty() {
            return Ok(completions);
        }

        let (programs, words) = tally(&recent);
        let now = Utc::now();
        let mut best: Option<(usize, f64)> = None;

        for (index, completion) in completions.iter_mut().enumerate() {
            let usage = if is_command_group(completion.group) {
                programs.get(completion.value.as_str())
            } else {
                words.get(completion.value.as_str())
            };
            let Some(usage) = usage else {
                continue;
            };

            let bonus = frecency_score(usage.count, usage.last_used, now);
            completion.score += bonus;
            if best.is_none_or(|(_, top)| bonus > top) {
                best = Some((index, bonus));
            }
        }

        if let Some((index, _)) = best {
            completions[index].group = CompletionGroup::TopSuggestion;
        }

        Ok(completions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::history::HistoryLimits;
    use crate::repl::input_state::InputMode;
    use chrono::TimeDelta;

    struct Fixed(Vec<Completion>);

    #[async_trait]
    impl Completer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_relevant(&self, state: &InputState) -> bool {
            state.mode == InputMode::Shell
        }

        async fn get_completions(&self, _state: &InputState) -> Result<Vec<Completion>> {
            Ok(self.0.clone())
        }
    }

    fn commands() -> Fixed {
        Fixed(vec![
            Completion::new("gcc", CompletionGroup::RecommendedCommand, 79.0, "fixed"),
            Completion::new("git", CompletionGroup::RecommendedCommand, 79.0, "fixed"),
            Completion::new("grep", CompletionGroup::RecommendedCommand, 78.0, "fixed"),
        ])
    }

    fn state() -> InputState {
        InputState::tokenized("g", 1, InputMode::Shell)
    }

    #[test]
    fn test_frecency_score() {
        let now = Utc::now();
        let fresh = frecency_score(3, now, now);
        let stale = frecency_score(3, now - TimeDelta::days(30), now);
        assert!(fresh > stale);
        assert_eq!(frecency_score(0, now, now), 0.0);
    }

    #[tokio::test]
    async fn test_no_history_passes_through() {
        let boosted = RecencyBoosted::new(commands(), Arc::new(HistoryProvider::default()));
        let results = boosted.get_completions(&state()).await.unwrap();
        assert_eq!(results, commands().0);
    }

    #[tokio::test]
    async fn test_best_match_promoted() {
        let history = Arc::new(HistoryProvider::default());
        history.add("grep -r foo");
        history.add("git status");
        history.add("git push");

        let boosted = RecencyBoosted::new(commands(), Arc::clone(&history));
        let results = boosted.get_completions(&state()).await.unwrap();

        let git = results.iter().find(|c| c.value == "git").unwrap();
        let grep = results.iter().find(|c| c.value == "grep").unwrap();
        let gcc = results.iter().find(|c| c.value == "gcc").unwrap();

        assert_eq!(git.group, CompletionGroup::TopSuggestion);
        assert_eq!(grep.group, CompletionGroup::RecommendedCommand);
        assert!(grep.score > 78.0);
        assert_eq!(gcc.score, 79.0);
    }

    #[tokio::test]
    async fn test_command_candidates_match_program_only() {
        let history = Arc::new(HistoryProvider::default());
        history.add("man git");

        let boosted = RecencyBoosted::new(commands(), history);
        let results = boosted.get_completions(&state()).await.unwrap();
        assert!(results.iter().all(|c| c.group != CompletionGroup::TopSuggestion));
    }

    #[tokio::test]
    async fn test_argument_candidates_match_any_word() {
        let history = Arc::new(HistoryProvider::new(HistoryLimits::default()));
        history.add("git checkout feature/login");

        let inner = Fixed(vec![
            Completion::new("feature/login", CompletionGroup::GitRef, 80.0, "fixed"),
            Completion::new("main", CompletionGroup::GitRef, 80.0, "fixed"),
        ]);
        let boosted = RecencyBoosted::new(inner, history);
        let results = boosted
            .get_completions(&InputState::tokenized("git checkout ", 13, InputMode::Shell))
            .await
            .unwrap();
        assert_eq!(results[0].group, CompletionGroup::TopSuggestion);
        assert_eq!(results[1].group, CompletionGroup::GitRef);
    }

    #[test]
    fn test_delegates_name_and_relevance() {
        let boosted = RecencyBoosted::new(commands(), Arc::new(HistoryProvider::default()));
        assert_eq!(boosted.name(), "fixed");
        assert!(boosted.is_relevant(&state()));
        assert!(!boosted.is_relevant(&InputState::tokenized("g", 1, InputMode::Nl)));
    }
}
