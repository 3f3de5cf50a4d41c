use std::env;
use std::sync::LazyLock;

use super::main::resolve_session_rolling_interval;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-FocusSession".to_string())
});

pub(super) static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30 * 24 * 60 * 60) // 30 days
});

/// Rolling rotation interval in milliseconds
pub(super) static SESSION_ROLLING_INTERVAL_MS: LazyLock<i64> = LazyLock::new(|| {
    resolve_session_rolling_interval(env::var("SESSION_ROLLING_MINUTES").ok().as_deref())
});

/// Name of the cookie carrying the session version seen at issuance
pub static SESSION_VERSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SESSION_VERSION_COOKIE_NAME").unwrap_or_else(|_| "sv".to_string())
});

/// Value the global session version starts at when the app state row is first created
pub(super) static SESSION_VERSION_SEED: LazyLock<i64> = LazyLock::new(|| {
    env::var("SESSION_VERSION")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
});

/// How long a fetched session version is trusted before it is re-read
pub(super) static SESSION_VERSION_CACHE_SECS: LazyLock<u64> = LazyLock::new(|| {
    env::var("SESSION_VERSION_CACHE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30)
});
