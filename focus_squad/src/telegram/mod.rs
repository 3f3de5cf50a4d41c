//! Telegram bot webhook handling: link commands and group video-chat status.

mod bot;
mod command;
mod config;
mod errors;
mod storage;
mod types;
mod webhook;

pub use bot::{BotApi, LogOnlyBot, OutgoingMessage, TelegramBotClient, default_bot};
pub use command::{BotCommand, parse_command};
pub use errors::TelegramError;
pub use types::{
    Chat, LiveState, LiveStatus, Message, TelegramUser, Update, VideoChatEnded,
    VideoChatScheduled, VideoChatStarted,
};
pub use webhook::{WebhookOutcome, get_live_status, handle_update, verify_webhook_secret};

pub(crate) use storage::LiveStatusStore;

pub(crate) async fn init() -> Result<(), TelegramError> {
    LiveStatusStore::init().await
}
