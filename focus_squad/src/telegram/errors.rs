use thiserror::Error;

use crate::link::LinkError;

#[derive(Debug, Error, Clone)]
pub enum TelegramError {
    #[error("Webhook secret mismatch")]
    Unauthorized,

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<sqlx::Error> for TelegramError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
