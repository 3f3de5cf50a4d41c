use std::sync::LazyLock;
use std::time::{Duration, Instant};

use http::header::HeaderMap;
use tokio::sync::RwLock;

use crate::session::config::{
    SESSION_COOKIE_MAX_AGE, SESSION_VERSION_CACHE_SECS, SESSION_VERSION_COOKIE_NAME,
};
use crate::session::errors::SessionError;
use crate::session::storage::AppStateStore;
use crate::utils::{CookieOptions, header_set_cookie};

/// Last fetched session version and when it was fetched
static VERSION_CACHE: LazyLock<RwLock<Option<(i64, Instant)>>> =
    LazyLock::new(|| RwLock::new(None));

/// The global session version, served from a short-lived per-process cache.
///
/// A bump made through [`bump_session_version`] in this process is visible
/// immediately; bumps made by other processes become visible once the cache
/// entry is older than `SESSION_VERSION_CACHE_SECS`.
pub async fn current_session_version() -> Result<i64, SessionError> {
    let ttl = Duration::from_secs(*SESSION_VERSION_CACHE_SECS);

    if let Some((version, fetched_at)) = *VERSION_CACHE.read().await {
        if fetched_at.elapsed() < ttl {
            return Ok(version);
        }
    }

    let mut cache = VERSION_CACHE.write().await;
    // Another task may have refreshed it while we waited for the write lock.
    if let Some((version, fetched_at)) = *cache {
        if fetched_at.elapsed() < ttl {
            return Ok(version);
        }
    }

    let version = AppStateStore::get_session_version().await?;
    tracing::debug!(session_version = version, "Fetched session version");
    *cache = Some((version, Instant::now()));
    Ok(version)
}

/// Invalidates every existing session by incrementing the global session version.
pub async fn bump_session_version() -> Result<i64, SessionError> {
    let version = AppStateStore::bump_session_version().await?;
    *VERSION_CACHE.write().await = Some((version, Instant::now()));
    Ok(version)
}

/// `Set-Cookie` header recording the session version a browser was issued under.
pub fn session_version_cookie_header(version: i64) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_VERSION_COOKIE_NAME.as_str(),
        &version.to_string(),
        CookieOptions::http_only(*SESSION_COOKIE_MAX_AGE as i64),
    )?;
    Ok(headers)
}
