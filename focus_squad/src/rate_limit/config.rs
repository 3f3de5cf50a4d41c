use std::env;
use std::sync::LazyLock;

pub(super) static RATE_LIMIT_MAX_REQUESTS: LazyLock<u32> = LazyLock::new(|| {
    env::var("RATE_LIMIT_MAX_REQUESTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|max| *max > 0)
        .unwrap_or(30)
});

pub(super) static RATE_LIMIT_WINDOW_SECS: LazyLock<u64> = LazyLock::new(|| {
    env::var("RATE_LIMIT_WINDOW_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(60)
});
