//! Error types for grid persistence.

use geo_common::ResourceError;
use thiserror::Error;

/// Errors that can occur while reading or writing arrays.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open an array.
    #[error("failed to open array: {0}")]
    OpenFailed(String),

    /// Failed to read data from an array.
    #[error("failed to read array data: {0}")]
    ReadFailed(String),

    /// Failed to write an array.
    #[error("failed to write array data: {0}")]
    WriteFailed(String),

    /// Array attributes are missing or malformed.
    #[error("invalid array metadata: {0}")]
    InvalidMetadata(String),

    /// No array at the expected location.
    #[error("array not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Filesystem error.
    #[error("storage io error: {0}")]
    Io(String),
}

impl StoreError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create a WriteFailed error.
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

impl From<StoreError> for ResourceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ResourceError::missing_data(format!("{} not in store", what)),
            StoreError::ConfigError(msg) => ResourceError::config(msg),
            other => ResourceError::storage(other.to_string()),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
