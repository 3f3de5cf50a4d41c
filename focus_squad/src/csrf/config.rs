use std::env;
use std::sync::LazyLock;

pub static CSRF_COOKIE_NAME: LazyLock<String> =
    LazyLock::new(|| env::var("CSRF_COOKIE_NAME").unwrap_or_else(|_| "csrf-token".to_string()));

pub static CSRF_HEADER_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("CSRF_HEADER_NAME")
        .map(|name| name.to_ascii_lowercase())
        .unwrap_or_else(|_| "x-csrf-token".to_string())
});

pub(super) static CSRF_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("CSRF_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(24 * 60 * 60) // 1 day
});
