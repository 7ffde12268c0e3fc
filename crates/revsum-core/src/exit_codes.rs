//! Exit codes for the revsum CLI.
//!
//! Exit codes communicate the outcome of session setup without requiring
//! output parsing.

use revsum_common::Error;

/// Exit codes for revsum operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Configuration resolved (and applied, for `init`)
    Clean = 0,

    /// Settings invalid, unreadable, or missing
    ConfigError = 10,

    /// I/O error
    IoError = 13,

    /// No connection to the analytical engine
    EngineUnavailable = 20,

    /// Catalog or schema does not exist
    UnknownNamespace = 21,

    /// Engine rejected a statement for another reason
    EngineError = 22,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::InvalidSettings(_) | Error::SettingsNotFound { .. } => {
                ExitCode::ConfigError
            }
            Error::EngineUnavailable(_) => ExitCode::EngineUnavailable,
            Error::UnknownNamespace { .. } => ExitCode::UnknownNamespace,
            Error::EngineExecution { .. } => ExitCode::EngineError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}
