//! Command-name completer
//!
//! Candidates come from three places, each with its own group so that the
//! ranking puts well-known commands ahead of whatever happens to be on `$PATH`:
//!
//! - shell builtins (`Builtin`)
//! - a curated set of commonly used tools (`RecommendedCommand`)
//! - executables found on `$PATH` (`OtherCommand`)

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use super::candidate::{Completion, CompletionGroup, prefix_score};
use super::completer::Completer;
use super::trigger::TriggerKind;
use crate::error::{CompleterError, Result};
use crate::repl::input_state::{InputMode, InputState};

/// Category of a recommended command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Shell,
    VersionControl,
    PackageManager,
    Runtime,
    Container,
    Network,
    Editor,
}

impl CommandCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCategory::Shell => "shell",
            CommandCategory::VersionControl => "version control",
            CommandCategory::PackageManager => "package manager",
            CommandCategory::Runtime => "runtime",
            CommandCategory::Container => "container",
            CommandCategory::Network => "network",
            CommandCategory::Editor => "editor",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builtins of common POSIX shells
pub const SHELL_BUILTINS: &[&str] = &[
    "alias", "bg", "cd", "dirs", "echo", "eval", "exec", "exit", "export", "fg", "jobs",
    "popd", "pushd", "pwd", "read", "set", "source", "type", "ulimit", "umask", "unalias",
    "unset", "wait",
];

/// Curated commands ranked above arbitrary `$PATH` executables
pub const RECOMMENDED_COMMANDS: &[(&str, CommandCategory)] = &[
    ("ls", CommandCategory::Shell),
    ("cat", CommandCategory::Shell),
    ("grep", CommandCategory::Shell),
    ("find", CommandCategory::Shell),
    ("cp", CommandCategory::Shell),
    ("mv", CommandCategory::Shell),
    ("rm", CommandCategory::Shell),
    ("mkdir", CommandCategory::Shell),
    ("touch", CommandCategory::Shell),
    ("head", CommandCategory::Shell),
    ("tail", CommandCategory::Shell),
    ("less", CommandCategory::Shell),
    ("sed", CommandCategory::Shell),
    ("awk", CommandCategory::Shell),
    ("chmod", CommandCategory::Shell),
    ("git", CommandCategory::VersionControl),
    ("gh", CommandCategory::VersionControl),
    ("hg", CommandCategory::VersionControl),
    ("svn", CommandCategory::VersionControl),
    ("npm", CommandCategory::PackageManager),
    ("pnpm", CommandCategory::PackageManager),
    ("yarn", CommandCategory::PackageManager),
    ("cargo", CommandCategory::PackageManager),
    ("pip", CommandCategory::PackageManager),
    ("brew", CommandCategory::PackageManager),
    ("apt", CommandCategory::PackageManager),
    ("node", CommandCategory::Runtime),
    ("python", CommandCategory::Runtime),
    ("python3", CommandCategory::Runtime),
    ("deno", CommandCategory::Runtime),
    ("bun", CommandCategory::Runtime),
    ("go", CommandCategory::Runtime),
    ("ruby", CommandCategory::Runtime),
    ("java", CommandCategory::Runtime),
    ("docker", CommandCategory::Container),
    ("podman", CommandCategory::Container),
    ("kubectl", CommandCategory::Container),
    ("helm", CommandCategory::Container),
    ("curl", CommandCategory::Network),
    ("wget", CommandCategory::Network),
    ("ssh", CommandCategory::Network),
    ("scp", CommandCategory::Network),
    ("ping", CommandCategory::Network),
    ("vim", CommandCategory::Editor),
    ("nvim", CommandCategory::Editor),
    ("nano", CommandCategory::Editor),
    ("emacs", CommandCategory::Editor),
    ("code", CommandCategory::Editor),
];

/// Look up the category of a curated command
pub fn recommended_category(name: &str) -> Option<CommandCategory> {
    RECOMMENDED_COMMANDS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, category)| *category)
}

/// Cache for `$PATH` executable names
struct PathCache {
    executables: Vec<String>,
    /// `$PATH` value the executables were read from
    path_var: String,
    /// None until the first scan
    last_fetch: Option<Instant>,
    ttl: Duration,
}

impl PathCache {
    fn new(ttl: Duration) -> Self {
        Self {
            executables: Vec::new(),
            path_var: String::new(),
            last_fetch: None,
            ttl,
        }
    }

    fn is_valid(&self, path_var: &str) -> bool {
        self.path_var == path_var
            && self
                .last_fetch
                .is_some_and(|fetched| fetched.elapsed() < self.ttl)
    }

    fn update(&mut self, path_var: String, executables: Vec<String>) {
        self.path_var = path_var;
        self.executables = executables;
        self.last_fetch = Some(Instant::now());
    }
}

/// Completes the command word of a shell line
pub struct CommandCompleter {
    cache: Arc<RwLock<PathCache>>,
    /// Fixed search path; `$PATH` is read on every query when unset
    path_override: Option<String>,
}

impl CommandCompleter {
    pub const NAME: &'static str = "command";

    /// Create a completer whose `$PATH` scan is cached for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(PathCache::new(ttl))),
            path_override: None,
        }
    }

    /// Scan `path_var` instead of the process `$PATH`
    pub fn with_path(mut self, path_var: impl Into<String>) -> Self {
        self.path_override = Some(path_var.into());
        self
    }

    fn current_path(&self) -> String {
        match &self.path_override {
            Some(path) => path.clone(),
            None => std::env::var("PATH").unwrap_or_default(),
        }
    }

    /// Executable names on the search path, from cache when still fresh
    pub async fn executables(&self) -> Result<Vec<String>> {
        let path_var = self.current_path();

        {
            let cache = match self.cache.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if cache.is_valid(&path_var) {
                return Ok(cache.executables.clone());
            }
        }

        let scan_path = path_var.clone();
        let executables = tokio::task::spawn_blocking(move || scan_executables(&scan_path))
            .await
            .map_err(|e| CompleterError::Failed {
                completer: Self::NAME.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Scanned {} executable(s) from PATH", executables.len());

        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.update(path_var, executables.clone());
        Ok(executables)
    }
}

#[async_trait]
impl Completer for CommandCompleter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &InputState) -> bool {
        state.mode == InputMode::Shell && state.trigger.kind == TriggerKind::Command
    }

    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>> {
        let prefix = state.trigger.prefix.as_str();
        let mut completions = Vec::new();

        for builtin in SHELL_BUILTINS {
            let score = prefix_score(builtin, prefix);
            if score > 0.0 {
                completions.push(
                    Completion::new(*builtin, CompletionGroup::Builtin, score, Self::NAME)
                        .with_description("shell builtin"),
                );
            }
        }

        for (command, category) in RECOMMENDED_COMMANDS {
            let score = prefix_score(command, prefix);
            if score > 0.0 {
                completions.push(
                    Completion::new(
                        *command,
                        CompletionGroup::RecommendedCommand,
                        score,
                        Self::NAME,
                    )
                    .with_description(category.as_str()),
                );
            }
        }

        // Listing every executable for an empty prefix is noise
        if prefix.is_empty() {
            return Ok(completions);
        }

        let known: HashSet<&str> = SHELL_BUILTINS
            .iter()
            .copied()
            .chain(RECOMMENDED_COMMANDS.iter().map(|(command, _)| *command))
            .collect();

        for executable in self.executables().await? {
            if known.contains(executable.as_str()) {
                continue;
            }
            let score = prefix_score(&executable, prefix);
            if score > 0.0 {
                completions.push(Completion::new(
                    executable,
                    CompletionGroup::OtherCommand,
                    score,
                    Self::NAME,
                ));
            }
        }

        Ok(completions)
    }
}

/// Read executable names from every directory of a `$PATH`-style string
fn scan_executables(path_var: &str) -> Vec<String> {
    let mut names = HashSet::new();

    for dir in std::env::split_paths(path_var) {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if is_executable(&entry.path())
                && let Some(name) = entry.file_name().to_str()
            {
                names.insert(name.to_string());
            }
        }
    }

    let mut sorted: Vec<String> = names.into_iter().collect();
    sorted.sort();
    sorted
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
