//! Error types for the risk client

use thiserror::Error;

/// Risk client error
///
/// Only configuration problems reach callers. Remote failures are
/// carried as [`RemoteError`] and absorbed by the deterministic fallback.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration source error
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),
}

/// Failure talking to the remote risk-intelligence service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Key rejected or lacking scope (401/403)
    #[error("Insufficient privilege (status {status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Non-success status
    #[error("Remote service returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Request timed out
    #[error("Remote request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body was not valid JSON
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Expected condition when the key lacks elevated scope
    pub fn is_auth(&self) -> bool {
        matches!(self, RemoteError::Unauthorized { .. })
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Unauthorized { .. } => "unauthorized",
            RemoteError::Status { .. } => "bad_status",
            RemoteError::Timeout => "timeout",
            RemoteError::Transport(_) => "transport",
            RemoteError::Decode(_) => "malformed",
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
