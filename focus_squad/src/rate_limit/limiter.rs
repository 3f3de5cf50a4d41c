use http::header::HeaderMap;

use crate::storage::GENERIC_CACHE_STORE;

use super::config::{RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS};
use super::errors::RateLimitError;

const RATE_LIMIT_PREFIX: &str = "rate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// Seconds until the window resets; only meaningful when denied
    pub retry_after_secs: u64,
}

/// Fixed-window request limiter over the shared cache store.
///
/// Counters live in the cache store, so with Redis the limit holds across
/// every instance of the service.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    group: String,
    max_requests: u32,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(group: &str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            group: group.to_string(),
            max_requests: max_requests.max(1),
            window_secs: window_secs.max(1),
        }
    }

    /// Limiter using `RATE_LIMIT_MAX_REQUESTS` per `RATE_LIMIT_WINDOW_SECS`.
    pub fn from_env(group: &str) -> Self {
        Self::new(group, *RATE_LIMIT_MAX_REQUESTS, *RATE_LIMIT_WINDOW_SECS)
    }

    /// Counts one request for `key` and decides whether it may proceed.
    pub async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let counter_key = format!("{}:{key}", self.group);
        let counter = GENERIC_CACHE_STORE
            .lock()
            .await
            .incr_with_ttl(RATE_LIMIT_PREFIX, &counter_key, self.window_secs as usize)
            .await?;

        let decision = decide(counter.count, counter.ttl_secs, self.max_requests, self.window_secs);
        if !decision.allowed {
            tracing::warn!(
                group = %self.group,
                key,
                count = counter.count,
                "Rate limit exceeded"
            );
        }
        Ok(decision)
    }
}

fn decide(count: i64, ttl_secs: u64, max_requests: u32, window_secs: u64) -> RateLimitDecision {
    let max = i64::from(max_requests);
    RateLimitDecision {
        allowed: count <= max,
        remaining: (max - count).max(0) as u32,
        retry_after_secs: if ttl_secs == 0 { window_secs } else { ttl_secs },
    }
}

/// Best guess at the client address: the first `x-forwarded-for` hop, then
/// `x-real-ip`, else `"unknown"`.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use http::HeaderValue;
    use serial_test::serial;

    #[test]
    fn test_decide() {
        assert_eq!(
            decide(1, 60, 3, 60),
            RateLimitDecision {
                allowed: true,
                remaining: 2,
                retry_after_secs: 60
            }
        );
        assert!(decide(3, 10, 3, 60).allowed);
        assert_eq!(decide(3, 10, 3, 60).remaining, 0);

        let denied = decide(4, 10, 3, 60);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.retry_after_secs, 10);

        assert_eq!(decide(5, 0, 3, 60).retry_after_secs, 60);
    }

    #[test]
    fn test_client_key() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "10.0.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[tokio::test]
    #[serial]
    async fn test_denies_after_max_within_window() {
        init_test_environment().await;
        let limiter = RateLimiter::new("test-deny", 3, 60);
        let key = format!("client-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check(&key).await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.check(&key).await.unwrap();
        assert!(!denied.allowed);
        assert!(denied.retry_after_secs > 0 && denied.retry_after_secs <= 60);

        let other = limiter.check(&format!("{key}-other")).await.unwrap();
        assert!(other.allowed);
    }

    #[tokio::test]
    #[serial]
    async fn test_groups_count_separately() {
        init_test_environment().await;
        let key = format!("shared-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));

        assert!(RateLimiter::new("group-a", 1, 60).check(&key).await.unwrap().allowed);
        assert!(RateLimiter::new("group-b", 1, 60).check(&key).await.unwrap().allowed);
        assert!(!RateLimiter::new("group-a", 1, 60).check(&key).await.unwrap().allowed);
    }
}
