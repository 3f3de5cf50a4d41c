use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error, Clone)]
pub enum RateLimitError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for RateLimitError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
