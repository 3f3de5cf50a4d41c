use thiserror::Error;

use crate::storage::StorageError;
use crate::userdb::UserError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Session error")]
    SessionError,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Header error: {0}")]
    HeaderError(String),

    #[error("User is blocked")]
    Blocked,

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from user database operations
    #[error("User error: {0}")]
    User(#[from] UserError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_from_storage_error() {
        let err = SessionError::from(StorageError::Storage("redis gone".to_string()));
        assert_eq!(err.to_string(), "Storage error: Storage error: redis gone");
    }

    #[test]
    fn test_session_error_from_user_error() {
        let err = SessionError::from(UserError::NotFound);
        assert!(matches!(err, SessionError::User(UserError::NotFound)));
    }
}
