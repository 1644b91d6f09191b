//! Error types for the qttt crate

use thiserror::Error;

/// Main error type for the qttt crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid action: cell {position} is occupied or out of range (must be 0-8)")]
    InvalidAction { position: usize },

    #[error("game already over")]
    GameOver,

    #[error("no legal actions available")]
    NoLegalActions,

    #[error("match abandoned before it finished")]
    MatchAbandoned,

    #[error("invalid board '{input}': {reason}")]
    InvalidBoard { input: String, reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid canonical state key '{key}': {reason}")]
    InvalidStateKey { key: String, reason: String },

    #[error("corrupt data in {source_name}: {message}")]
    CorruptData {
        source_name: String,
        message: String,
    },

    #[error("unsupported save format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
