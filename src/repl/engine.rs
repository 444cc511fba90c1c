//! Input engine: the single entry point the line editor calls per keystroke
//!
//! The engine ties tokenizing, trigger detection, completion and the menu
//! together. Menu and renderer state sit behind a mutex that is only held for
//! short synchronous sections, never across an `.await`, so one engine can be
//! shared between the keystroke handler and in-flight completion updates.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::completion::{
    CommandCompleter, Completion, CompletionManager, CompletionOptions, EntityCompleter,
    FileCompleter, GitRefCompleter, RecencyBoosted, SlashCompleter,
};
use super::highlighter::{AnsiStyler, Styler, TokenHighlighter, styler_for};
use super::history::{HistoryLimits, HistoryProvider};
use super::input_state::{InputMode, InputState};
use super::keys::{Key, KeyHandler, KeyOutcome, Modifiers};
use super::menu::CompletionMenu;
use super::renderer::MenuRenderer;
use crate::config::Config;
use crate::error::Result;

/// Recent commands copied into every input snapshot
const SNAPSHOT_HISTORY: usize = 50;

/// Result of [`InputEngine::update_completions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The menu now shows this many candidates
    Applied(usize),
    /// No trigger or no candidates; the menu is inactive
    Cleared,
    /// A newer update started first; this one was discarded
    Stale,
}

/// Mutable state guarded by the engine mutex
#[derive(Default)]
struct EngineState {
    menu: CompletionMenu,
    renderer: MenuRenderer,
    last_mode: Option<InputMode>,
    /// Snapshot the current menu was computed from
    menu_source: Option<InputState>,
}

pub struct InputEngine {
    manager: Arc<CompletionManager>,
    history: Arc<HistoryProvider>,
    entities: EntityCompleter,
    options: CompletionOptions,
    cwd: PathBuf,
    styler: Box<dyn Styler>,
    highlighter: TokenHighlighter,
    generation: AtomicU64,
    state: Mutex<EngineState>,
}

impl InputEngine {
    /// Create an engine over an existing registry
    ///
    /// # Arguments
    /// * `manager` - Completer registry to query
    /// * `history` - Recency list shared with recency-boosted completers
    ///
    /// An [`EntityCompleter`] is registered on `manager` and exposed through
    /// [`entities`](Self::entities). If `manager` already holds a completer
    /// named `entity`, that one stays and the handle serves nothing.
    pub fn new(manager: Arc<CompletionManager>, history: Arc<HistoryProvider>) -> Self {
        let entities = EntityCompleter::new();
        manager.register_completer(Arc::new(entities.clone()));

        Self {
            manager,
            history,
            entities,
            options: CompletionOptions::default(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            styler: Box::new(AnsiStyler),
            highlighter: TokenHighlighter::default(),
            generation: AtomicU64::new(0),
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Create an engine with the built-in completers registered
    ///
    /// # Arguments
    /// * `config` - Completion, menu, history and display settings
    /// * `cwd` - Directory for file and git completion
    pub fn with_defaults(config: &Config, cwd: impl Into<PathBuf>) -> Self {
        let history = Arc::new(HistoryProvider::new(HistoryLimits::from(&config.history)));
        let manager = Arc::new(CompletionManager::new());

        manager.register_completer(Arc::new(RecencyBoosted::new(
            CommandCompleter::new(config.path_cache_ttl()),
            Arc::clone(&history),
        )));
        manager.register_completer(Arc::new(SlashCompleter::new()));
        manager.register_completer(Arc::new(RecencyBoosted::new(
            GitRefCompleter::new(),
            Arc::clone(&history),
        )));
        manager.register_completer(Arc::new(FileCompleter::new()));

        let mut engine = Self::new(manager, history)
            .with_cwd(cwd)
            .with_options(CompletionOptions::with_max_results(
                config.completion.max_results,
            ))
            .with_renderer(MenuRenderer::from(&config.menu))
            .with_styler(styler_for(config.display.color_output));
        engine.highlighter = TokenHighlighter::new(config.display.syntax_highlighting);
        engine
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_renderer(self, renderer: MenuRenderer) -> Self {
        self.lock().renderer = renderer;
        self
    }

    pub fn with_styler(mut self, styler: Box<dyn Styler>) -> Self {
        self.styler = styler;
        self
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn manager(&self) -> &Arc<CompletionManager> {
        &self.manager
    }

    pub fn history(&self) -> &Arc<HistoryProvider> {
        &self.history
    }

    /// Handle for pushing `@` entities
    pub fn entities(&self) -> &EntityCompleter {
        &self.entities
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Build the tokenized snapshot for a keystroke
    pub fn snapshot(&self, raw_text: &str, cursor_pos: usize, mode: InputMode) -> InputState {
        InputState::new(raw_text, cursor_pos, mode)
            .with_cwd(&self.cwd)
            .with_history(self.history.recent_commands(SNAPSHOT_HISTORY))
            .update_with_tokens()
    }

    /// Recompute the menu for the current input
    ///
    /// Only the most recently started call may publish its results: a call
    /// that finishes after a newer one has started returns
    /// [`UpdateOutcome::Stale`] and leaves the menu alone.
    pub async fn update_completions(
        &self,
        raw_text: &str,
        cursor_pos: usize,
        mode: InputMode,
    ) -> UpdateOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.snapshot(raw_text, cursor_pos, mode);

        {
            let mut inner = self.lock();
            if !self.is_latest(generation) {
                return UpdateOutcome::Stale;
            }
            if inner.last_mode.is_some_and(|last| last != mode) {
                debug!("Input mode changed to {}, clearing menu", mode);
                inner.menu.clear();
                inner.menu_source = None;
            }
            inner.last_mode = Some(mode);

            if !state.trigger.triggered {
                inner.menu.clear();
                inner.menu_source = None;
                return UpdateOutcome::Cleared;
            }
        }

        let completions = self.manager.get_completions(&state, self.options).await;

        let mut inner = self.lock();
        if !self.is_latest(generation) {
            debug!("Discarding stale completions for generation {}", generation);
            return UpdateOutcome::Stale;
        }

        if completions.is_empty() {
            inner.menu.clear();
            inner.menu_source = None;
            return UpdateOutcome::Cleared;
        }

        let count = completions.len();
        inner.menu.set_completions(completions);
        inner.menu_source = Some(state);
        UpdateOutcome::Applied(count)
    }

    /// Route a keypress to the menu
    ///
    /// On accept the menu closes and the outcome carries the character range
    /// of the input that the inserted text replaces. Accepting or dismissing
    /// also discards any update still in flight, so the menu stays closed.
    pub fn handle_keypress(&self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        let mut inner = self.lock();
        let outcome = KeyHandler::handle(&mut inner.menu, key, modifiers);

        match outcome {
            KeyOutcome::Accepted { insert_text, .. } => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                let replace_range = inner
                    .menu_source
                    .take()
                    .and_then(|source| source.trigger.replace_range(source.cursor_pos));
                KeyOutcome::Accepted {
                    insert_text,
                    replace_range,
                }
            }
            KeyOutcome::Dismissed => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                inner.menu_source = None;
                KeyOutcome::Dismissed
            }
            other => other,
        }
    }

    /// Terminal output drawing the current menu
    pub fn render_menu(&self) -> Result<String> {
        let mut inner = self.lock();
        let EngineState { menu, renderer, .. } = &mut *inner;
        renderer.render(menu, self.styler.as_ref())
    }

    /// Terminal output erasing the last drawn menu
    pub fn clear_menu_output(&self) -> Result<String> {
        self.lock().renderer.clear()
    }

    pub fn is_active(&self) -> bool {
        self.lock().menu.is_active()
    }

    /// Currently selected candidate
    pub fn selected(&self) -> Option<Completion> {
        self.lock().menu.selected().cloned()
    }

    /// Candidates currently in the menu
    pub fn completions(&self) -> Vec<Completion> {
        self.lock().menu.completions().to_vec()
    }

    /// Drop all menu state and invalidate in-flight updates
    ///
    /// The renderer keeps its frame size so a following
    /// [`clear_menu_output`](Self::clear_menu_output) still erases it.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        inner.menu.clear();
        inner.menu_source = None;
        inner.last_mode = None;
    }

    /// Styled rendering of an input line
    pub fn highlight(&self, raw_text: &str) -> String {
        self.highlighter
            .highlight_with(raw_text, self.styler.as_ref())
    }

    /// Remember a submitted command for recency ranking
    pub fn record_command(&self, command: &str) -> bool {
        self.history.add(command)
    }
}
