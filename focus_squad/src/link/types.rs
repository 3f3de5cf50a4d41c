use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A one-time code binding a Telegram account to the email that requested it
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct LinkToken {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// What a user needs to finish linking in Telegram
#[derive(Debug, Clone, Serialize)]
pub struct LinkInvite {
    pub code: String,
    /// `https://t.me/<bot>?start=<code>`
    pub deep_link: String,
    pub expires_at: DateTime<Utc>,
}

/// The Telegram account on the other side of a link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramIdentity {
    pub telegram_user_id: i64,
    pub telegram_username: Option<String>,
}
