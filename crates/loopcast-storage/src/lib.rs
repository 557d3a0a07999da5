mod local;

pub use local::{LocalStorage, StoredUpload, UploadWriter};

use loopcast_core::AppError;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Failed to create file: {0}")]
    CreateFailed(String),

    #[error("Failed to write file: {0}")]
    WriteFailed(String),

    #[error("Failed to read upload stream: {0}")]
    ReadFailed(String),

    #[error("Failed to list storage directory: {0}")]
    ListFailed(String),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFilename(msg) => AppError::InvalidInput(msg),
            StorageError::ReadFailed(msg) => {
                AppError::InvalidInput(format!("Upload stream failed: {}", msg))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}
