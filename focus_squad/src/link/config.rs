use std::env;
use std::sync::LazyLock;

use crate::storage::DB_TABLE_PREFIX;

pub(super) static DB_TABLE_LINK_TOKENS: LazyLock<String> =
    LazyLock::new(|| format!("{}{}", *DB_TABLE_PREFIX, "link_tokens"));

/// Lifetime of a link code handed out through the deep link, in seconds
pub(super) static LINK_TOKEN_TTL_SECS: LazyLock<i64> = LazyLock::new(|| {
    env::var("LINK_TOKEN_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ttl| *ttl > 0)
        .unwrap_or(600)
});

/// Lifetime of the signed token in links the bot sends to unlinked users
pub(super) const BOT_LINK_TOKEN_TTL_SECS: i64 = 10 * 60;

pub(super) const LINK_TOKEN_BYTES: usize = 16;

/// Bot account name used to build `t.me` deep links
pub static TELEGRAM_BOT_USERNAME: LazyLock<String> = LazyLock::new(|| {
    env::var("TELEGRAM_BOT_USERNAME")
        .map(|name| name.trim_start_matches('@').to_string())
        .unwrap_or_else(|_| "FocusSquadBot".to_string())
});
