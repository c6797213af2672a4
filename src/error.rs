//! Error types for sitefmt
//!
//! This module defines the error hierarchy that covers:
//! - Discovery errors (fatal, abort the run before any task exists)
//! - Configuration and CLI errors
//! - Worker thread errors
//! - Static file server errors
//!
//! Per-file read and write failures are not errors at this level. They are
//! recorded as [`FileOutcome::Error`] and the run carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the sitefmt application
#[derive(Error, Debug)]
pub enum FormatError {
    /// File discovery failed
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Server errors
    #[cfg(feature = "server")]
    #[error("Server error: {0}")]
    Server(#[from] ServeError),
}

/// Errors raised while walking the source tree
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Root does not exist
    #[error("Directory not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Root exists but is not a directory
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// The walk failed partway (permission denied, vanished entry, ...)
    #[error("Failed to walk '{path}': {reason}")]
    Walk { path: PathBuf, reason: String },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    /// Empty suffix filter would match every file
    #[error("Suffix filter must not be empty")]
    EmptySuffix,

    /// Invalid blank line limit
    #[error("Invalid blank line limit {0}: must be at least 1")]
    InvalidBlankLines(usize),
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Failed to spawn a thread
    #[error("Failed to spawn {name}: {reason}")]
    SpawnFailed { name: String, reason: String },

    /// Outcome aggregator panicked
    #[error("Outcome aggregator panicked")]
    AggregatorPanicked,
}

/// Static file server errors
#[cfg(feature = "server")]
#[derive(Error, Debug)]
pub enum ServeError {
    /// Resolved file has an extension outside the allow-list
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No candidate file exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Root directory missing at startup
    #[error("Directory {0} does not exist")]
    MissingRoot(PathBuf),

    /// Invalid bind address
    #[error("Invalid bind address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for ServeError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, body) = match &self {
            ServeError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            ServeError::NotFound(_) => (StatusCode::NOT_FOUND, "404 page not found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };

        (status, body).into_response()
    }
}

/// Result type alias for ServeError
#[cfg(feature = "server")]
pub type ServeResult<T> = std::result::Result<T, ServeError>;

/// Result type alias for FormatError
pub type Result<T> = std::result::Result<T, FormatError>;

/// Result type alias for DiscoveryError
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// Represents the outcome of processing a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Content changed and was written back
    Formatted,

    /// Content was already normalized; nothing written
    Skipped,

    /// Reading, transforming or writing the file failed
    Error(String),
}

impl FileOutcome {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Formatted => "formatted",
            FileOutcome::Skipped => "skipped",
            FileOutcome::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(FileOutcome::Formatted.label(), "formatted");
        assert_eq!(FileOutcome::Skipped.label(), "skipped");
        assert_eq!(FileOutcome::Error("boom".into()).label(), "error");
    }

    #[test]
    fn test_error_conversion() {
        let err = DiscoveryError::NotFound {
            path: PathBuf::from("/missing"),
        };
        let top: FormatError = err.into();
        assert!(matches!(top, FormatError::Discovery(_)));
        assert!(top.to_string().contains("/missing"));
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::InvalidWorkerCount { count: 0, max: 512 };
        assert_eq!(
            err.to_string(),
            "Invalid worker count 0: must be between 1 and 512"
        );
    }
}
