//! Error types for review summarisation session setup.

use thiserror::Error;

/// Result type alias for revsum operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for revsum.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("settings file not found: {path}")]
    SettingsNotFound { path: String },

    // Engine errors (20-29)
    #[error("analytical engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("unknown {kind} '{name}': {message}")]
    UnknownNamespace {
        kind: String,
        name: String,
        message: String,
    },

    #[error("engine rejected statement `{statement}`: {message}")]
    EngineExecution { statement: String, message: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidSettings(_) => 11,
            Error::SettingsNotFound { .. } => 12,
            Error::EngineUnavailable(_) => 20,
            Error::UnknownNamespace { .. } => 21,
            Error::EngineExecution { .. } => 22,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
