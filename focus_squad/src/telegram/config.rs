use std::env;
use std::sync::LazyLock;

use crate::storage::DB_TABLE_PREFIX;

pub(super) static DB_TABLE_LIVE_STATUS: LazyLock<String> =
    LazyLock::new(|| format!("{}{}", *DB_TABLE_PREFIX, "live_status"));

/// Bot API token. Without it the webhook still processes updates but sends no replies.
pub(super) static TELEGRAM_BOT_TOKEN: LazyLock<Option<String>> = LazyLock::new(|| {
    env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
});

/// Group whose video chats drive the live status. Any chat is accepted when unset.
pub(super) static TELEGRAM_GROUP_ID: LazyLock<Option<i64>> = LazyLock::new(|| {
    env::var("TELEGRAM_GROUP_ID")
        .ok()
        .and_then(|id| id.trim().parse().ok())
});

pub(super) static TELEGRAM_WEBHOOK_SECRET: LazyLock<Option<String>> = LazyLock::new(|| {
    env::var("TELEGRAM_WEBHOOK_SECRET")
        .ok()
        .filter(|secret| !secret.is_empty())
});

pub(super) static TELEGRAM_API_BASE: LazyLock<String> = LazyLock::new(|| {
    env::var("TELEGRAM_API_BASE")
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "https://api.telegram.org".to_string())
});
