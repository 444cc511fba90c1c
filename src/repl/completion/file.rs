//! Filesystem path completer

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::candidate::{Completion, CompletionGroup, prefix_score};
use super::completer::Completer;
use super::trigger::TriggerKind;
use crate::error::{CompleterError, Result};
use crate::repl::input_state::InputState;

/// Maximum number of entries offered per query
pub const MAX_FILE_RESULTS: usize = 50;

/// Bonus that lifts directories above files with the same match quality
const DIRECTORY_BONUS: f64 = 5.0;

/// Completes file and directory names relative to the working directory
#[derive(Debug, Clone)]
pub struct FileCompleter {
    max_results: usize,
}

impl FileCompleter {
    pub const NAME: &'static str = "file";

    pub fn new() -> Self {
        Self {
            max_results: MAX_FILE_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Default for FileCompleter {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a typed path into its directory part (with trailing `/`) and the
/// partial entry name
fn split_partial(partial: &str) -> (&str, &str) {
    match partial.rfind('/') {
        Some(idx) => partial.split_at(idx + 1),
        None => ("", partial),
    }
}

/// Directory to list for a typed directory part
fn resolve_dir(dir_part: &str, state: &InputState) -> Option<PathBuf> {
    if dir_part.is_empty() {
        return Some(state.cwd.clone());
    }
    if let Some(rest) = dir_part.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    let path = PathBuf::from(dir_part);
    if path.is_absolute() {
        Some(path)
    } else {
        Some(state.cwd.join(path))
    }
}

#[async_trait]
impl Completer for FileCompleter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &InputState) -> bool {
        state.trigger.kind == TriggerKind::Entity
    }

    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>> {
        let partial = state.trigger.prefix.as_str();
        let (dir_part, name_prefix) = split_partial(partial);

        let Some(dir) = resolve_dir(dir_part, state) else {
            return Ok(Vec::new());
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                debug!("No directory to complete in: {}", dir.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CompleterError::SourceUnavailable {
                    completer: Self::NAME.to_string(),
                    reason: format!("{}: {}", dir.display(), e),
                }
                .into());
            }
        };

        let mut completions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();

            // Hidden entries only when explicitly asked for
            if name.starts_with('.') && !name_prefix.starts_with('.') {
                continue;
            }

            let score = prefix_score(&name, name_prefix);
            if score <= 0.0 {
                continue;
            }

            let is_dir = entry
                .file_type()
                .await
                .map(|ft| ft.is_dir())
                .unwrap_or(false);

            let (value, score, description) = if is_dir {
                (
                    format!("{dir_part}{name}/"),
                    score + DIRECTORY_BONUS,
                    "directory",
                )
            } else {
                (format!("{dir_part}{name}"), score, "file")
            };

            completions.push(
                Completion::new(value, CompletionGroup::File, score, Self::NAME)
                    .with_display(if is_dir { format!("{name}/") } else { name })
                    .with_description(description),
            );
        }

        completions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.value.cmp(&b.value))
        });
        completions.truncate(self.max_results);

        Ok(completions)
    }
}
