//! Configuration management for promptline
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::repl::InputMode;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Completion configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Completion menu configuration
    #[serde(default)]
    pub menu: MenuConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionConfig {
    /// Maximum number of ranked candidates kept per keystroke
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Input mode used when none is given explicitly
    #[serde(default = "default_mode")]
    pub default_mode: InputMode,

    /// How long a `$PATH` scan stays valid, in seconds
    #[serde(default = "default_path_cache_ttl")]
    pub path_cache_ttl_secs: u64,
}

/// Completion menu layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuConfig {
    /// Number of rows shown at once
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,

    /// Width of the value column
    #[serde(default = "default_value_width")]
    pub value_width: usize,

    /// Hide the terminal cursor while drawing
    #[serde(default = "default_hide_cursor")]
    pub hide_cursor: bool,

    /// Show a "(n/total)" row when the list is scrolled
    #[serde(default = "default_show_scroll_indicator")]
    pub show_scroll_indicator: bool,
}

/// Command history configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Entries older than this many days are dropped
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,

    /// Path to history file read at startup
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,
}

impl HistoryConfig {
    /// Maximum entry age, saturating for absurdly large day counts
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(SECS_PER_DAY))
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,

    /// Enable syntax highlighting of the input line
    #[serde(default = "default_syntax_highlighting")]
    pub syntax_highlighting: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_max_results() -> usize {
    50
}

fn default_mode() -> InputMode {
    InputMode::Shell
}

fn default_path_cache_ttl() -> u64 {
    30
}

fn default_max_visible() -> usize {
    10
}

fn default_value_width() -> usize {
    30
}

fn default_hide_cursor() -> bool {
    true
}

fn default_show_scroll_indicator() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_max_age_days() -> u64 {
    30
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".promptline_history")
}

fn default_color_output() -> bool {
    true
}

fn default_syntax_highlighting() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            default_mode: default_mode(),
            path_cache_ttl_secs: default_path_cache_ttl(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            value_width: default_value_width(),
            hide_cursor: default_hide_cursor(),
            show_scroll_indicator: default_show_scroll_indicator(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            max_age_days: default_max_age_days(),
            file_path: default_history_file(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
            syntax_highlighting: default_syntax_highlighting(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".promptline")
            .join("config.toml")
    }

    /// Load configuration from a file
    ///
    /// When `path` is `None` the default path is used. A missing file at the
    /// default path yields the default configuration; a missing file that was
    /// asked for explicitly is an error.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Apply `PROMPTLINE_*` environment variables on top of this configuration
    ///
    /// Recognized variables:
    /// - `PROMPTLINE_MAX_RESULTS`
    /// - `PROMPTLINE_MODE` (shell, slash, nl)
    /// - `PROMPTLINE_MENU_MAX_VISIBLE`
    /// - `PROMPTLINE_HISTORY_FILE`
    /// - `PROMPTLINE_NO_COLOR` (any value disables color)
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = env::var("PROMPTLINE_MAX_RESULTS") {
            self.completion.max_results = parse_env("completion.max_results", &value)?;
        }
        if let Ok(value) = env::var("PROMPTLINE_MODE") {
            self.completion.default_mode =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "completion.default_mode".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Ok(value) = env::var("PROMPTLINE_MENU_MAX_VISIBLE") {
            self.menu.max_visible = parse_env("menu.max_visible", &value)?;
        }
        if let Ok(value) = env::var("PROMPTLINE_HISTORY_FILE") {
            self.history.file_path = PathBuf::from(value);
        }
        if env::var_os("PROMPTLINE_NO_COLOR").is_some() {
            self.display.color_output = false;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.completion.max_results == 0 {
            return Err(invalid("completion.max_results", "0"));
        }
        if self.menu.max_visible == 0 {
            return Err(invalid("menu.max_visible", "0"));
        }
        if self.menu.value_width == 0 {
            return Err(invalid("menu.value_width", "0"));
        }
        if self.history.max_size == 0 {
            return Err(invalid("history.max_size", "0"));
        }
        Ok(())
    }

    /// `$PATH` cache lifetime as Duration
    pub fn path_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.completion.path_cache_ttl_secs)
    }

    /// Maximum history age as Duration
    pub fn history_max_age(&self) -> Duration {
        self.history.max_age()
    }
}

fn invalid(field: &str, value: &str) -> crate::error::PromptlineError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

fn parse_env<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.completion.max_results, 50);
        assert_eq!(config.completion.default_mode, InputMode::Shell);
        assert_eq!(config.menu.max_visible, 10);
        assert_eq!(config.menu.value_width, 30);
        assert!(config.display.color_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [menu]
            max_visible = 5

            [completion]
            default_mode = "nl"
            "#,
        )
        .unwrap();

        assert_eq!(config.menu.max_visible, 5);
        assert_eq!(config.menu.value_width, 30);
        assert_eq!(config.completion.default_mode, InputMode::Nl);
        assert_eq!(config.history.max_size, 1000);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[menu\nmax_visible = ").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.menu.hide_cursor = false;
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let mut config = Config::default();
        config.menu.max_visible = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let path = std::env::temp_dir().join("promptline-does-not-exist.toml");
        assert!(Config::load_from_file(Some(&path)).is_err());
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.path_cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.history_max_age(), Duration::from_secs(30 * 86_400));
    }

    #[test]
    fn test_huge_history_age_saturates() {
        let config =
            Config::from_toml_str("[history]\nmax_age_days = 999999999999999\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_max_age(), Duration::from_secs(u64::MAX));
    }
}
