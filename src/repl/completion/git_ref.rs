//! Git branch and tag completer
//!
//! Reads refs straight from the repository directory instead of spawning
//! `git`, so a keystroke never waits on a subprocess.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::candidate::{Completion, CompletionGroup, prefix_score};
use super::completer::Completer;
use super::trigger::TriggerKind;
use crate::error::Result;
use crate::repl::input_state::{InputMode, InputState};

/// Git subcommands whose arguments are refs
pub const REF_SUBCOMMANDS: &[&str] = &[
    "checkout",
    "switch",
    "merge",
    "rebase",
    "branch",
    "diff",
    "log",
    "reset",
    "cherry-pick",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RefKind {
    Branch,
    Tag,
    Remote,
}

impl RefKind {
    fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "heads" => Some(RefKind::Branch),
            "tags" => Some(RefKind::Tag),
            "remotes" => Some(RefKind::Remote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
            RefKind::Remote => "remote branch",
        }
    }

    fn score_bonus(&self) -> f64 {
        match self {
            RefKind::Branch => 2.0,
            RefKind::Tag => 1.0,
            RefKind::Remote => 0.0,
        }
    }
}

/// Completes ref arguments of `git checkout`, `git merge` and friends
#[derive(Debug, Default, Clone)]
pub struct GitRefCompleter;

impl GitRefCompleter {
    pub const NAME: &'static str = "git_ref";

    pub fn new() -> Self {
        Self
    }
}

/// Git subcommand of the line when the cursor is on one of its arguments
fn ref_subcommand(state: &InputState) -> Option<&str> {
    let position = state.trigger.position?;
    let mut words = state
        .tokens
        .iter()
        .filter(|t| !t.is_whitespace() && t.end() <= position)
        .map(|t| t.value.as_str());

    if words.next()? != "git" {
        return None;
    }
    words.next().filter(|sub| REF_SUBCOMMANDS.contains(sub))
}

/// Nearest git directory at or above `cwd`
async fn find_git_dir(cwd: &Path) -> Option<PathBuf> {
    for dir in cwd.ancestors() {
        let candidate = dir.join(".git");
        let Ok(meta) = tokio::fs::metadata(&candidate).await else {
            continue;
        };
        if meta.is_dir() {
            return Some(candidate);
        }
        // Worktrees and submodules point at the real git dir
        if meta.is_file() {
            let content = tokio::fs::read_to_string(&candidate).await.ok()?;
            let target = content.trim().strip_prefix("gitdir:")?.trim();
            return Some(dir.join(target));
        }
    }
    None
}

/// Collect loose refs under `refs/<namespace>`
async fn read_loose_refs(
    git_dir: &Path,
    namespace: &str,
    kind: RefKind,
    refs: &mut BTreeMap<String, RefKind>,
) -> Result<()> {
    let root = git_dir.join("refs").join(namespace);
    let mut pending = vec![root.clone()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
                continue;
            }
            if let Ok(relative) = path.strip_prefix(&root) {
                let name = relative.to_string_lossy().replace('\\', "/");
                // Symbolic refs such as `origin/HEAD` are not checkout targets
                if !name.ends_with("HEAD") {
                    refs.entry(name).or_insert(kind);
                }
            }
        }
    }
    Ok(())
}

/// Collect refs from `packed-refs`
async fn read_packed_refs(git_dir: &Path, refs: &mut BTreeMap<String, RefKind>) -> Result<()> {
    let content = match tokio::fs::read_to_string(git_dir.join("packed-refs")).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for line in content.lines() {
        if line.starts_with('#') || line.starts_with('^') {
            continue;
        }
        let Some((_, full_name)) = line.split_once(' ') else {
            continue;
        };
        let Some(rest) = full_name.trim().strip_prefix("refs/") else {
            continue;
        };
        let Some((namespace, name)) = rest.split_once('/') else {
            continue;
        };
        if let Some(kind) = RefKind::from_namespace(namespace) {
            refs.entry(name.to_string()).or_insert(kind);
        }
    }
    Ok(())
}

/// All branch, tag and remote-branch names of the repository containing `cwd`
pub async fn list_refs(cwd: &Path) -> Result<BTreeMap<String, RefKind>> {
    let mut refs = BTreeMap::new();
    let Some(git_dir) = find_git_dir(cwd).await else {
        return Ok(refs);
    };
    debug!("Reading refs from {}", git_dir.display());

    read_loose_refs(&git_dir, "heads", RefKind::Branch, &mut refs).await?;
    read_loose_refs(&git_dir, "tags", RefKind::Tag, &mut refs).await?;
    read_loose_refs(&git_dir, "remotes", RefKind::Remote, &mut refs).await?;
    read_packed_refs(&git_dir, &mut refs).await?;
    Ok(refs)
}

#[async_trait]
impl Completer for GitRefCompleter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_relevant(&self, state: &InputState) -> bool {
        state.mode == InputMode::Shell
            && state.trigger.kind == TriggerKind::Entity
            && !state.is_entity_trigger
            && ref_subcommand(state).is_some()
    }

    async fn get_completions(&self, state: &InputState) -> Result<Vec<Completion>> {
        let prefix = state.trigger.prefix.as_str();
        let refs = list_refs(&state.cwd).await?;

        let completions = refs
            .into_iter()
            .filter_map(|(name, kind)| {
                let score = prefix_score(&name, prefix);
                if score <= 0.0 {
                    return None;
                }
                Some(
                    Completion::new(
                        name,
                        CompletionGroup::GitRef,
                        score + kind.score_bonus(),
                        Self::NAME,
                    )
                    .with_description(kind.as_str()),
                )
            })
            .collect();

        Ok(completions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_repo(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "promptline-git-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        let git = root.join(".git");
        std::fs::create_dir_all(git.join("refs/heads/feature")).unwrap();
        std::fs::create_dir_all(git.join("refs/tags")).unwrap();
        std::fs::create_dir_all(git.join("refs/remotes/origin")).unwrap();
        std::fs::create_dir_all(root.join("src/nested")).unwrap();
        std::fs::write(git.join("refs/heads/main"), "abc\n").unwrap();
        std::fs::write(git.join("refs/heads/feature/login"), "abc\n").unwrap();
        std::fs::write(git.join("refs/tags/v1.0"), "abc\n").unwrap();
        std::fs::write(git.join("refs/remotes/origin/HEAD"), "ref: refs/remotes/origin/main\n")
            .unwrap();
        std::fs::write(git.join("refs/remotes/origin/main"), "abc\n").unwrap();
        std::fs::write(
            git.join("packed-refs"),
            "# pack-refs with: peeled fully-peeled sorted\n\
             111 refs/heads/release\n\
             222 refs/tags/v0.9\n\
             ^333\n\
             444 refs/heads/main\n",
        )
        .unwrap();
        root
    }

    fn state(text: &str, cwd: &Path) -> InputState {
        InputState::new(text, text.chars().count(), InputMode::Shell)
            .with_cwd(cwd)
            .update_with_tokens()
    }

    #[test]
    fn test_relevance() {
        let cwd = std::env::temp_dir();
        let completer = GitRefCompleter::new();
        assert!(completer.is_relevant(&state("git checkout ", &cwd)));
        assert!(completer.is_relevant(&state("git merge fe", &cwd)));
        assert!(!completer.is_relevant(&state("git commit ", &cwd)));
        assert!(!completer.is_relevant(&state("git che", &cwd)));
        assert!(!completer.is_relevant(&state("ls ", &cwd)));
        assert!(!completer.is_relevant(&state("git checkout @x", &cwd)));
    }

    #[tokio::test]
    async fn test_lists_loose_and_packed_refs() {
        let root = fake_repo("list");
        let refs = list_refs(&root.join("src/nested")).await.unwrap();

        let names: Vec<&str> = refs.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["feature/login", "main", "origin/main", "release", "v0.9", "v1.0"]
        );
        assert_eq!(refs["v1.0"], RefKind::Tag);
        assert_eq!(refs["release"], RefKind::Branch);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_completes_prefix() {
        let root = fake_repo("prefix");
        let results = GitRefCompleter::new()
            .get_completions(&state("git checkout fe", &root))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, "feature/login");
        assert_eq!(results[0].group, CompletionGroup::GitRef);
        assert_eq!(results[0].description.as_deref(), Some("branch"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_outside_repository_is_empty() {
        let dir = std::env::temp_dir().join(format!("promptline-git-none-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        // Only meaningful when the temp dir itself is not inside a repository
        if find_git_dir(&dir).await.is_none() {
            assert!(list_refs(&dir).await.unwrap().is_empty());
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
