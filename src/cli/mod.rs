//! Command-line interface for promptline
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Loading the plain-text history file
//! - Subcommands that drive the input engine non-interactively

mod completion;

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{Config, LogLevel};
use crate::error::{PromptlineError, Result};
use crate::parser::ShellLexer;
use crate::repl::history::HistoryEntry;
use crate::repl::{InputEngine, InputMode, InputState, Key, KeyOutcome};

pub use completion::generate_completion;

/// Promptline - shell-aware input engine for terminal clients
#[derive(Parser, Debug)]
#[command(
    name = "promptline",
    version,
    about = "Shell-aware tokenizer and completion engine",
    long_about = "Tokenize command lines, detect completion triggers and produce ranked
completion menus the way an interactive terminal client would on every keystroke."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// History file, one command per line
    #[arg(long, value_name = "FILE", global = true)]
    pub history_file: Option<PathBuf>,

    /// Working directory for file and git completion
    #[arg(long, value_name = "DIR", global = true)]
    pub cwd: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for promptline
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the token stream of a line
    Tokenize {
        /// Input line
        #[arg(value_name = "LINE")]
        line: String,
    },

    /// Print the completion trigger at a cursor position
    Trigger {
        /// Input line
        #[arg(value_name = "LINE")]
        line: String,

        /// Cursor position in characters (default: end of line)
        #[arg(long)]
        cursor: Option<usize>,

        /// Input mode (shell, slash, nl)
        #[arg(long)]
        mode: Option<InputMode>,
    },

    /// Print ranked completions, optionally replaying menu keys
    Complete {
        /// Input line
        #[arg(value_name = "LINE")]
        line: String,

        /// Cursor position in characters (default: end of line)
        #[arg(long)]
        cursor: Option<usize>,

        /// Input mode (shell, slash, nl)
        #[arg(long)]
        mode: Option<InputMode>,

        /// Maximum number of candidates
        #[arg(long, value_name = "N")]
        max_results: Option<usize>,

        /// Keys to replay over the menu (tab, shift-tab, up, down, enter, esc)
        #[arg(long, value_delimiter = ',', value_name = "KEYS")]
        keys: Vec<String>,

        /// Also print the rendered menu
        #[arg(long)]
        render: bool,
    },

    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with environment and arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        config.apply_env()?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else {
            config.logging.level
        };

        if let Some(path) = &args.history_file {
            config.history.file_path = path.clone();
        }
    }

    fn working_dir(&self) -> PathBuf {
        self.args
            .cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub async fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Tokenize { line }) => {
                self.print_tokens(line)?;
                Ok(true)
            }
            Some(Commands::Trigger { line, cursor, mode }) => {
                self.print_trigger(line, *cursor, *mode)?;
                Ok(true)
            }
            Some(Commands::Complete {
                line,
                cursor,
                mode,
                max_results,
                keys,
                render,
            }) => {
                self.run_complete(line, *cursor, *mode, *max_results, keys, *render)
                    .await?;
                Ok(true)
            }
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Print usage when no subcommand was given
    pub fn print_help(&self) -> Result<()> {
        CliArgs::command().print_help()?;
        println!();
        Ok(())
    }

    fn print_tokens(&self, line: &str) -> Result<()> {
        let tokens = ShellLexer::tokenize(line);
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        Ok(())
    }

    fn print_trigger(&self, line: &str, cursor: Option<usize>, mode: Option<InputMode>) -> Result<()> {
        let cursor = cursor.unwrap_or_else(|| line.chars().count());
        let mode = mode.unwrap_or(self.config.completion.default_mode);
        let state = InputState::tokenized(line, cursor, mode);

        let report = json!({
            "mode": state.mode,
            "cursor": state.cursor_pos,
            "token_index": state.token_index,
            "current_token": state.current_token,
            "prefix": state.prefix,
            "is_slash_command": state.is_slash_command,
            "is_entity_trigger": state.is_entity_trigger,
            "trigger": state.trigger,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    async fn run_complete(
        &self,
        line: &str,
        cursor: Option<usize>,
        mode: Option<InputMode>,
        max_results: Option<usize>,
        keys: &[String],
        render: bool,
    ) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(max) = max_results {
            config.completion.max_results = max;
        }
        let cursor = cursor.unwrap_or_else(|| line.chars().count());
        let mode = mode.unwrap_or(config.completion.default_mode);

        let engine = InputEngine::with_defaults(&config, self.working_dir());
        for entry in load_history(&config.history.file_path)? {
            engine.history().add_entry(entry);
        }

        let outcome = engine.update_completions(line, cursor, mode).await;
        debug!("update outcome: {:?}", outcome);

        let completions = engine.completions();
        if render {
            eprint!("{}", engine.highlight(line));
            eprint!("{}", engine.render_menu()?);
            eprintln!();
        }

        let mut accepted = None;
        for name in keys {
            let Some((key, modifiers)) = Key::parse(name) else {
                return Err(PromptlineError::Generic(format!("unknown key: {name}")));
            };
            if let KeyOutcome::Accepted {
                insert_text,
                replace_range,
            } = engine.handle_keypress(key, modifiers)
            {
                accepted = Some(json!({
                    "insert_text": insert_text,
                    "replace_range": replace_range.map(|r| [r.start, r.end]),
                }));
            }
        }

        let report = json!({
            "completions": completions,
            "selected": engine.selected(),
            "active": engine.is_active(),
            "accepted": accepted,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// Show version information
    fn show_version(&self) {
        println!("promptline version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return Ok(());
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();

        match self.config.to_toml() {
            Ok(toml_str) => println!("{}", toml_str),
            Err(e) => {
                eprintln!("Error formatting configuration: {}", e);
                println!("{:#?}", self.config);
            }
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

/// Read a plain history file, one command per line, oldest first
///
/// A missing file is an empty history.
pub fn load_history(path: &Path) -> Result<Vec<HistoryEntry>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No history file at {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!("Cannot read history file {}: {}", path.display(), e);
            return Err(e.into());
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(HistoryEntry::new)
        .collect())
}
