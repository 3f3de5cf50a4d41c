use thiserror::Error;

use crate::token::TokenError;
use crate::userdb::UserError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum LinkError {
    /// The code is unknown, expired or was already used
    #[error("Link code expired or invalid")]
    InvalidOrExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("User error: {0}")]
    User(#[from] UserError),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<sqlx::Error> for LinkError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
