use chrono::{Duration, Utc};
use http::header::HeaderMap;

use crate::session::config::{
    SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME, SESSION_ROLLING_INTERVAL_MS,
    SESSION_VERSION_COOKIE_NAME,
};
use crate::session::errors::SessionError;
use crate::session::types::{StoredSession, User as SessionUser};
use crate::storage::GENERIC_CACHE_STORE;
use crate::userdb::UserStore;
use crate::utils::{CookieOptions, get_cookie_from_headers, header_set_cookie};

use super::rotation::{generate_session_id, needs_rolling_rotation};
use super::version::current_session_version;

const SESSION_PREFIX: &str = "session";
const SESSION_ID_BYTES: usize = 16;

/// Outcome of looking up the session a request carries
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No session cookie, or it points at nothing usable
    Anonymous,
    /// A live session whose user has been blocked
    Blocked { user_id: String },
    Active {
        user: SessionUser,
        session_id: String,
        /// Version recorded in the session when it was issued
        session_version: i64,
        /// Global version at the time of the lookup
        current_version: i64,
        /// `Set-Cookie` headers to send when the session id was rotated
        rotated_headers: Option<HeaderMap>,
    },
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Active { user, .. } => Some(user),
            _ => None,
        }
    }
}

/// The session id carried in the request's cookies, if any.
pub fn get_session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    let session_id = get_cookie_from_headers(headers, SESSION_COOKIE_NAME.as_str());
    if session_id.is_none() {
        tracing::debug!("No session cookie '{}' found", SESSION_COOKIE_NAME.as_str());
    }
    session_id
}

/// Creates a session for `user_id` and returns the headers that set its cookies.
///
/// Besides the session id cookie, the session version cookie is set to the
/// current version so the session gate sees a matching value on the next request.
pub async fn create_session_with_uid(user_id: &str) -> Result<HeaderMap, SessionError> {
    let session_version = current_session_version().await?;
    let session_id = store_new_session(user_id, session_version).await?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.as_str(),
        &session_id,
        CookieOptions::http_only(*SESSION_COOKIE_MAX_AGE as i64),
    )?;
    header_set_cookie(
        &mut headers,
        SESSION_VERSION_COOKIE_NAME.as_str(),
        &session_version.to_string(),
        CookieOptions::http_only(*SESSION_COOKIE_MAX_AGE as i64),
    )?;

    tracing::info!(user_id, session_version, "Session created");
    Ok(headers)
}

/// Signs in the account owning `email`, creating it on first use.
///
/// Intended for the identity layer once it has verified the email. Blocked
/// accounts are refused.
#[tracing::instrument(skip(label))]
pub async fn create_session_for_account(
    email: &str,
    label: &str,
) -> Result<(SessionUser, HeaderMap), SessionError> {
    let user = UserStore::find_or_create_by_email(email, label).await?;
    if user.is_blocked {
        tracing::warn!(user_id = %user.id, "Refusing session for blocked user");
        return Err(SessionError::Blocked);
    }

    let headers = create_session_with_uid(&user.id).await?;
    Ok((SessionUser::from(user), headers))
}

/// Retrieves the user of a valid, current session.
///
/// The user row is always read from the database, so admin, blocked and
/// Telegram link status reflect the latest state.
pub async fn get_user_from_session(session_id: &str) -> Result<SessionUser, SessionError> {
    let stored_session = load_session(session_id)
        .await?
        .ok_or(SessionError::SessionError)?;

    if stored_session.expires_at < Utc::now() {
        tracing::debug!("Session expired at {}", stored_session.expires_at);
        delete_session_from_store(session_id).await?;
        return Err(SessionError::SessionError);
    }

    if stored_session.session_version != current_session_version().await? {
        tracing::debug!(
            session_version = stored_session.session_version,
            "Session issued under an outdated session version"
        );
        return Err(SessionError::SessionError);
    }

    let user = UserStore::get_user(&stored_session.user_id)
        .await?
        .ok_or(SessionError::SessionError)?;

    if user.is_blocked {
        return Err(SessionError::Blocked);
    }

    Ok(SessionUser::from(user))
}

/// Resolves the request's session, rotating its id when the rolling interval has passed.
///
/// Stale sessions (issued under an older session version) are reported as
/// active with differing versions and are never rotated; the caller decides
/// how to end them.
pub async fn resolve_session(headers: &HeaderMap) -> Result<SessionState, SessionError> {
    let Some(session_id) = get_session_id_from_headers(headers) else {
        return Ok(SessionState::Anonymous);
    };

    let stored_session = match load_session(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return Ok(SessionState::Anonymous),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session");
            return Ok(SessionState::Anonymous);
        }
    };

    if stored_session.expires_at < Utc::now() {
        tracing::debug!("Session expired at {}", stored_session.expires_at);
        delete_session_from_store(session_id).await?;
        return Ok(SessionState::Anonymous);
    }

    let Some(user) = UserStore::get_user(&stored_session.user_id).await? else {
        tracing::debug!(user_id = %stored_session.user_id, "Session user no longer exists");
        delete_session_from_store(session_id).await?;
        return Ok(SessionState::Anonymous);
    };

    if user.is_blocked {
        return Ok(SessionState::Blocked { user_id: user.id });
    }

    let current_version = current_session_version().await?;
    let now_ms = Utc::now().timestamp_millis();
    let mut session_id = session_id.to_string();
    let mut rotated_headers = None;

    if stored_session.session_version == current_version
        && needs_rolling_rotation(
            Some(stored_session.issued_at),
            now_ms,
            *SESSION_ROLLING_INTERVAL_MS,
        )
    {
        let new_id = store_new_session(&user.id, stored_session.session_version).await?;
        delete_session_from_store(&session_id).await?;

        let mut headers = HeaderMap::new();
        header_set_cookie(
            &mut headers,
            SESSION_COOKIE_NAME.as_str(),
            &new_id,
            CookieOptions::http_only(*SESSION_COOKIE_MAX_AGE as i64),
        )?;

        tracing::debug!(user_id = %user.id, "Rotated session id");
        session_id = new_id;
        rotated_headers = Some(headers);
    }

    Ok(SessionState::Active {
        user: SessionUser::from(user),
        session_id,
        session_version: stored_session.session_version,
        current_version,
        rotated_headers,
    })
}

/// Prepare a logout response by expiring the session cookies and deleting the session from storage
pub async fn prepare_logout_response(headers: &HeaderMap) -> Result<HeaderMap, SessionError> {
    let mut response_headers = HeaderMap::new();
    header_set_cookie(
        &mut response_headers,
        SESSION_COOKIE_NAME.as_str(),
        "",
        CookieOptions::expired(),
    )?;
    header_set_cookie(
        &mut response_headers,
        SESSION_VERSION_COOKIE_NAME.as_str(),
        "",
        CookieOptions::expired(),
    )?;

    if let Some(session_id) = get_session_id_from_headers(headers) {
        delete_session_from_store(session_id).await?;
    }
    Ok(response_headers)
}

async fn store_new_session(user_id: &str, session_version: i64) -> Result<String, SessionError> {
    let session_id = generate_session_id(SESSION_ID_BYTES)?;
    let ttl = *SESSION_COOKIE_MAX_AGE;
    let now = Utc::now();

    let stored_session = StoredSession {
        user_id: user_id.to_string(),
        session_version,
        issued_at: now.timestamp_millis(),
        expires_at: now + Duration::seconds(ttl as i64),
        ttl,
    };

    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            SESSION_PREFIX,
            &session_id,
            stored_session.try_into()?,
            ttl as usize,
        )
        .await?;

    Ok(session_id)
}

async fn load_session(session_id: &str) -> Result<Option<StoredSession>, SessionError> {
    let cached = GENERIC_CACHE_STORE
        .lock()
        .await
        .get(SESSION_PREFIX, session_id)
        .await?;

    cached.map(StoredSession::try_from).transpose()
}

pub(crate) async fn delete_session_from_store(session_id: &str) -> Result<(), SessionError> {
    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(SESSION_PREFIX, session_id)
        .await?;
    Ok(())
}
