//! Unified error handling for quotactl-core

use thiserror::Error;

/// Core error type for quotactl-core
#[derive(Error, Debug)]
pub enum Error {
    /// An include filter was requested over a document without `id`/`name`
    #[error("Selection error: {0}")]
    Selection(String),

    /// A capability required by the command is not compiled into this build
    #[error("Missing capability: {0}")]
    MissingCapability(String),

    /// A quota or project read against the cloud failed
    #[error("Upstream read error ({operation}): {message}")]
    UpstreamRead { operation: String, message: String },

    /// A quota write against the cloud failed
    #[error("Upstream write error ({operation}): {message}")]
    UpstreamWrite { operation: String, message: String },

    /// A snapshot, reference or exclude document could not be parsed
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for quotactl-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a selection error
    pub fn selection(msg: impl Into<String>) -> Self {
        Error::Selection(msg.into())
    }

    /// Create a missing capability error
    pub fn missing_capability(msg: impl Into<String>) -> Self {
        Error::MissingCapability(msg.into())
    }

    /// Create an upstream read error for the named operation
    pub fn upstream_read(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::UpstreamRead {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Create an upstream write error for the named operation
    pub fn upstream_write(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::UpstreamWrite {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Create a malformed document error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedDocument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Error::Auth(msg.into())
    }
}
