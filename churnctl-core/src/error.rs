/// Structured error types for churnctl-core.
///
/// Library consumers get composable `thiserror` errors; the `churnctl`
/// binary wraps them in `anyhow` for reporting.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for churnctl-core operations
#[derive(Error, Debug)]
pub enum ChurnError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// The request never produced a response (connection refused, timeout, ...)
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    /// The service answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// A raw form field could not be interpreted
    #[error("Invalid form field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Result type alias for churnctl-core operations
pub type Result<T> = std::result::Result<T, ChurnError>;

impl ChurnError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a transport error for the given URL
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Create a status error for the given URL
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a config error
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
