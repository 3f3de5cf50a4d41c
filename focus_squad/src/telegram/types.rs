use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Incoming webhook payload. Only the fields the bot reacts to are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix seconds
    pub date: i64,
    pub chat: Chat,
    pub from: Option<TelegramUser>,
    pub text: Option<String>,
    pub video_chat_scheduled: Option<VideoChatScheduled>,
    pub video_chat_started: Option<VideoChatStarted>,
    pub video_chat_ended: Option<VideoChatEnded>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoChatScheduled {
    /// Unix seconds
    pub start_date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoChatStarted {}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoChatEnded {
    /// Seconds
    pub duration: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveState {
    Scheduled,
    Live,
    Ended,
}

impl LiveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for LiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LiveState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "live" => Ok(Self::Live),
            "ended" => Ok(Self::Ended),
            other => Err(format!("unknown live state: {other}")),
        }
    }
}

/// Video-chat state of a group
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LiveStatus {
    pub chat_id: i64,
    pub status: LiveState,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Row form of [`LiveStatus`]; the state is stored as text.
#[derive(Debug, Clone, FromRow)]
pub(super) struct LiveStatusRow {
    pub(super) chat_id: i64,
    pub(super) status: String,
    pub(super) scheduled_for: Option<DateTime<Utc>>,
    pub(super) started_at: Option<DateTime<Utc>>,
    pub(super) ended_at: Option<DateTime<Utc>>,
    pub(super) updated_at: DateTime<Utc>,
}

impl TryFrom<LiveStatusRow> for LiveStatus {
    type Error = String;

    fn try_from(row: LiveStatusRow) -> Result<Self, Self::Error> {
        Ok(Self {
            chat_id: row.chat_id,
            status: row.status.parse()?,
            scheduled_for: row.scheduled_for,
            started_at: row.started_at,
            ended_at: row.ended_at,
            updated_at: row.updated_at,
        })
    }
}
