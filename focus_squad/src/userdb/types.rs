use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A Focus Squad account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Database-assigned sequence number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<i64>,
    /// Unique user identifier
    pub id: String,
    /// Sign-in email, stored lowercased
    pub email: String,
    /// Display name
    pub label: String,
    pub is_admin: bool,
    /// Blocked users cannot hold a session
    pub is_blocked: bool,
    pub telegram_user_id: Option<i64>,
    pub telegram_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, email: &str, label: String) -> Self {
        let now = Utc::now();
        Self {
            sequence_number: None,
            id,
            email: normalize_email(email),
            label,
            is_admin: false,
            is_blocked: false,
            telegram_user_id: None,
            telegram_username: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_telegram_linked(&self) -> bool {
        self.telegram_user_id.is_some()
    }
}

/// Lowercases and trims an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub enum UserSearchField {
    Id(String),
    Email(String),
    TelegramUserId(i64),
}

impl fmt::Display for UserSearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Email(email) => write!(f, "email={email}"),
            Self::TelegramUserId(tg_id) => write!(f, "telegram_user_id={tg_id}"),
        }
    }
}
