use std::{fmt, io};

/// Crate-wide `Result` type using [`PromptlineError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, PromptlineError>;

/// Top-level error type for promptline operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum PromptlineError {
    /// Configuration errors.
    Config(ConfigError),

    /// Completer failures.
    Completer(CompleterError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/// Errors raised by a completer while producing candidates.
#[derive(Debug)]
pub enum CompleterError {
    /// The completer could not reach its data source.
    SourceUnavailable { completer: String, reason: String },

    /// The completer panicked while producing candidates.
    Panicked { completer: String },

    /// Any other completer failure.
    Failed { completer: String, reason: String },
}

impl CompleterError {
    /// Name of the completer that failed
    pub fn completer(&self) -> &str {
        match self {
            CompleterError::SourceUnavailable { completer, .. }
            | CompleterError::Panicked { completer }
            | CompleterError::Failed { completer, .. } => completer,
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for PromptlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptlineError::Config(e) => write!(f, "Configuration error: {e}"),
            PromptlineError::Completer(e) => write!(f, "Completion error: {e}"),
            PromptlineError::Io(e) => write!(f, "I/O error: {e}"),
            PromptlineError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for CompleterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompleterError::SourceUnavailable { completer, reason } => {
                write!(f, "{completer}: source unavailable: {reason}")
            }
            CompleterError::Panicked { completer } => write!(f, "{completer}: panicked"),
            CompleterError::Failed { completer, reason } => write!(f, "{completer}: {reason}"),
        }
    }
}

impl std::error::Error for PromptlineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PromptlineError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for CompleterError {}

/* ========================= Conversions to PromptlineError ========================= */

impl From<io::Error> for PromptlineError {
    fn from(err: io::Error) -> Self {
        PromptlineError::Io(err)
    }
}

impl From<ConfigError> for PromptlineError {
    fn from(err: ConfigError) -> Self {
        PromptlineError::Config(err)
    }
}

impl From<CompleterError> for PromptlineError {
    fn from(err: CompleterError) -> Self {
        PromptlineError::Completer(err)
    }
}

impl From<toml::de::Error> for PromptlineError {
    fn from(err: toml::de::Error) -> Self {
        PromptlineError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for PromptlineError {
    fn from(err: toml::ser::Error) -> Self {
        PromptlineError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for PromptlineError {
    fn from(err: serde_json::Error) -> Self {
        PromptlineError::Generic(format!("JSON error: {err}"))
    }
}

impl From<String> for PromptlineError {
    fn from(msg: String) -> Self {
        PromptlineError::Generic(msg)
    }
}

impl From<&str> for PromptlineError {
    fn from(msg: &str) -> Self {
        PromptlineError::Generic(msg.to_owned())
    }
}
