//! Completion candidates and their ranking buckets

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Priority bucket, the primary sort key for ranked completions
///
/// Declaration order is the ranking order: `TopSuggestion` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompletionGroup {
    TopSuggestion,
    InternalCommand,
    Builtin,
    RecommendedCommand,
    OtherCommand,
    File,
    GitRef,
    Entity,
    Other,
}

/// A single completion suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Text that replaces the trigger prefix when accepted
    pub value: String,
    /// Text shown in the menu instead of `value`
    pub display: Option<String>,
    pub description: Option<String>,
    pub group: CompletionGroup,
    /// Higher is better within a group
    pub score: f64,
    /// Name of the completer that produced this candidate
    pub source: String,
    pub icon: Option<String>,
}

impl Completion {
    pub fn new(
        value: impl Into<String>,
        group: CompletionGroup,
        score: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            display: None,
            description: None,
            group,
            score,
            source: source.into(),
            icon: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Text to show in the menu
    pub fn label(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.value)
    }
}

/// Ranking order: group ascending, then score descending
pub fn rank_order(a: &Completion, b: &Completion) -> Ordering {
    a.group
        .cmp(&b.group)
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
}

/// Score a candidate against a typed prefix
///
/// Exact match scores highest, then a case-sensitive prefix match, then a
/// case-insensitive one. An empty prefix matches everything with a neutral
/// score. Zero means "no match".
pub fn prefix_score(candidate: &str, prefix: &str) -> f64 {
    if prefix.is_empty() {
        return 50.0;
    }
    if candidate == prefix {
        return 100.0;
    }
    if candidate.starts_with(prefix) {
        // Closer matches rank a little higher
        let extra = candidate.chars().count() - prefix.chars().count();
        return 80.0 - (extra.min(10) as f64);
    }
    if candidate.to_lowercase().starts_with(&prefix.to_lowercase()) {
        return 60.0;
    }
    0.0
}
