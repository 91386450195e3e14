//! Storage error types

use snapi_domain::SnapiError;
use thiserror::Error;

/// Secure store error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Secure storage access failed: {0}")]
    AccessFailed(String),

    #[error("Secure storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored value for {key} is not valid UTF-8")]
    BadEncoding { key: String },

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Result alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for SnapiError {
    fn from(err: StorageError) -> Self {
        SnapiError::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}
