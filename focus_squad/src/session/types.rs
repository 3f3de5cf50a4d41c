use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::errors::SessionError;
use crate::storage::CacheData;
use crate::userdb::User as DbUser;

/// The signed-in user as seen by request handlers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub label: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub telegram_linked: bool,
    pub telegram_username: Option<String>,
    pub sequence_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(db_user: DbUser) -> Self {
        Self {
            telegram_linked: db_user.is_telegram_linked(),
            id: db_user.id,
            email: db_user.email,
            label: db_user.label,
            is_admin: db_user.is_admin,
            is_blocked: db_user.is_blocked,
            telegram_username: db_user.telegram_username,
            sequence_number: db_user.sequence_number.unwrap_or(0),
            created_at: db_user.created_at,
            updated_at: db_user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct StoredSession {
    pub(super) user_id: String,
    /// Global session version when the session was issued
    pub(super) session_version: i64,
    /// Last issuance (creation or rotation), unix milliseconds
    pub(super) issued_at: i64,
    pub(super) expires_at: DateTime<Utc>,
    pub(super) ttl: u64,
}

impl TryFrom<StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(data: StoredSession) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(&data)
                .map_err(|e| SessionError::Storage(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
