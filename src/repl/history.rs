//! In-memory command history
//!
//! A bounded recency list that completers consult to boost recently used
//! values. Size and age limits are enforced lazily whenever the list is read.
//! Persistence is left to the caller, which can seed the provider through
//! [`HistoryProvider::with_entries`].

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HistoryConfig;

/// A command and when it was last run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(command: impl Into<String>) -> Self {
        Self::at(command, Utc::now())
    }

    pub fn at(command: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            command: command.into(),
            timestamp,
        }
    }

    /// First word of the command
    pub fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }
}

/// Retention limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub max_size: usize,
    pub max_age: Duration,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_size: 1000,
            max_age: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl From<&HistoryConfig> for HistoryLimits {
    fn from(config: &HistoryConfig) -> Self {
        Self {
            max_size: config.max_size,
            max_age: config.max_age(),
        }
    }
}

/// Thread-safe recency list, oldest entry first
#[derive(Debug, Default)]
pub struct HistoryProvider {
    entries: Mutex<Vec<HistoryEntry>>,
    limits: HistoryLimits,
}

impl HistoryProvider {
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            limits,
        }
    }

    /// Seed the provider with entries loaded elsewhere, in chronological order
    pub fn with_entries(entries: Vec<HistoryEntry>, limits: HistoryLimits) -> Self {
        let provider = Self::new(limits);
        for entry in entries {
            provider.add_entry(entry);
        }
        provider
    }

    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Lock and drop entries that exceed the limits
    fn pruned(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        let mut entries = self.lock();

        let max_age = TimeDelta::from_std(self.limits.max_age).unwrap_or(TimeDelta::MAX);
        if let Some(cutoff) = Utc::now().checked_sub_signed(max_age) {
            entries.retain(|e| e.timestamp >= cutoff);
        }

        if entries.len() > self.limits.max_size {
            let excess = entries.len() - self.limits.max_size;
            entries.drain(..excess);
        }
        entries
    }

    /// Record a command run now
    ///
    /// Blank commands are ignored. Repeating the latest command refreshes its
    /// timestamp instead of adding a duplicate. Returns whether the list changed.
    pub fn add(&self, command: &str) -> bool {
        self.add_entry(HistoryEntry::new(command.trim()))
    }

    /// Record an entry with its own timestamp
    pub fn add_entry(&self, mut entry: HistoryEntry) -> bool {
        entry.command = entry.command.trim().to_string();
        if entry.command.is_empty() {
            return false;
        }

        let mut entries = self.lock();
        if let Some(last) = entries.last_mut()
            && last.command == entry.command
        {
            last.timestamp = last.timestamp.max(entry.timestamp);
            return true;
        }
        entries.push(entry);
        true
    }

    /// All retained entries, oldest first
    pub fn get_entries(&self) -> Vec<HistoryEntry> {
        self.pruned().clone()
    }

    /// Up to `n` entries, most recent first
    pub fn get_recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.pruned().iter().rev().take(n).cloned().collect()
    }

    /// Up to `n` commands, most recent first
    pub fn recent_commands(&self, n: usize) -> Vec<String> {
        self.pruned()
            .iter()
            .rev()
            .take(n)
            .map(|e| e.command.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.pruned().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limits(max_size: usize, max_age_secs: u64) -> HistoryLimits {
        HistoryLimits {
            max_size,
            max_age: Duration::from_secs(max_age_secs),
        }
    }

    #[test]
    fn test_add_and_recent_order() {
        let history = HistoryProvider::default();
        history.add("ls");
        history.add("git status");
        history.add("cargo test");

        let recent: Vec<String> = history
            .get_recent(2)
            .into_iter()
            .map(|e| e.command)
            .collect();
        assert_eq!(recent, vec!["cargo test", "git status"]);

        let all: Vec<String> = history.get_entries().into_iter().map(|e| e.command).collect();
        assert_eq!(all, vec!["ls", "git status", "cargo test"]);
    }

    #[test]
    fn test_blank_commands_ignored() {
        let history = HistoryProvider::default();
        assert!(!history.add(""));
        assert!(!history.add("   "));
        assert!(history.is_empty());
    }

    #[test]
    fn test_repeat_refreshes_latest() {
        let history = HistoryProvider::default();
        let earlier = Utc::now() - TimeDelta::minutes(5);
        history.add_entry(HistoryEntry::at("make", earlier));
        history.add("make");

        let entries = history.get_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].timestamp > earlier);

        // Non-adjacent repeats are kept
        history.add("ls");
        history.add("make");
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_max_size_pruned_on_read() {
        let history = HistoryProvider::new(limits(3, 3600));
        for i in 0..5 {
            history.add(&format!("cmd{i}"));
        }
        let all: Vec<String> = history.get_entries().into_iter().map(|e| e.command).collect();
        assert_eq!(all, vec!["cmd2", "cmd3", "cmd4"]);
    }

    #[test]
    fn test_max_age_pruned_on_read() {
        let history = HistoryProvider::new(limits(100, 60));
        history.add_entry(HistoryEntry::at("old", Utc::now() - TimeDelta::hours(1)));
        history.add("new");

        let recent = history.get_recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].command, "new");
    }

    #[test]
    fn test_with_entries_and_clear() {
        let history = HistoryProvider::with_entries(
            vec![HistoryEntry::new("a"), HistoryEntry::new(""), HistoryEntry::new("b")],
            HistoryLimits::default(),
        );
        assert_eq!(history.recent_commands(5), vec!["b", "a"]);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let history = Arc::new(HistoryProvider::default());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        history.add(&format!("t{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(history.len(), 100);
    }

    #[test]
    fn test_limits_from_huge_age_config() {
        let config = HistoryConfig {
            max_age_days: 999_999_999_999_999,
            ..HistoryConfig::default()
        };
        let limits = HistoryLimits::from(&config);
        assert_eq!(limits.max_age, Duration::from_secs(u64::MAX));

        let history = HistoryProvider::new(limits);
        history.add("ls");
        assert_eq!(history.recent_commands(1), vec!["ls".to_string()]);
    }

    #[test]
    fn test_entry_serde() {
        let entry = HistoryEntry::new("git push");
        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.program(), Some("git"));
    }
}
