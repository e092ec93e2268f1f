//! Error types for the medwatch system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for medwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the medwatch system
#[derive(Error, Debug)]
pub enum Error {
    /// Listing fetch failed or produced an unusable result (fatal to a run)
    #[error("listing error: {0}")]
    Listing(String),

    /// A single doctor's detail-page fetch failed (degraded, never fatal)
    #[error("detail error: {0}")]
    Detail(String),

    /// Notification delivery failed (reportable, does not block persistence)
    #[error("notify error: {0}")]
    Notify(String),

    /// Snapshot store errors
    #[error("snapshot store error: {0}")]
    SnapshotStore(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a listing error
    pub fn listing(msg: impl Into<String>) -> Self {
        Self::Listing(msg.into())
    }

    /// Create a detail error
    pub fn detail(msg: impl Into<String>) -> Self {
        Self::Detail(msg.into())
    }

    /// Create a notify error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Create a snapshot store error
    pub fn snapshot_store(msg: impl Into<String>) -> Self {
        Self::SnapshotStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
