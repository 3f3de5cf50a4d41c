use chrono::Utc;
use http::Method;
use http::header::HeaderMap;

use crate::config::AUTH_SECRET;
use crate::session::User as SessionUser;
use crate::userdb::UserStore;

use super::config::{INTERNAL_ADMIN_SIGNATURE_HEADER, INTERNAL_SIGNATURE_MAX_AGE_SECS};
use super::errors::AdminGuardError;
use super::internal::verify_internal_signature;

/// Who passed the admin guard
#[derive(Debug, Clone, PartialEq)]
pub enum AdminPrincipal {
    /// An interactive admin, as currently stored in the database
    User(SessionUser),
    /// A machine caller holding the shared secret
    Internal,
}

impl AdminPrincipal {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User(user) => Some(&user.id),
            Self::Internal => None,
        }
    }
}

/// Requires a signed-in admin.
///
/// The admin flag is read from the database rather than trusted from the
/// session, so a demotion takes effect on the next request.
pub async fn require_admin_session(
    session: Option<&SessionUser>,
) -> Result<AdminPrincipal, AdminGuardError> {
    let Some(session_user) = session else {
        return Err(AdminGuardError::Unauthorized);
    };

    let user = UserStore::get_user(&session_user.id)
        .await?
        .ok_or(AdminGuardError::Unauthorized)?;

    if !user.is_admin || user.is_blocked {
        tracing::warn!(user_id = %user.id, "Non-admin user attempted an admin action");
        return Err(AdminGuardError::Forbidden);
    }

    Ok(AdminPrincipal::User(SessionUser::from(user)))
}

/// Requires a signed-in admin or a valid internal signature for this method and path.
///
/// A signed-in non-admin without a valid signature is refused with
/// [`AdminGuardError::Forbidden`]; everyone else without one gets
/// [`AdminGuardError::Unauthorized`].
pub async fn require_admin_or_internal(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    session: Option<&SessionUser>,
) -> Result<AdminPrincipal, AdminGuardError> {
    let session_result = match session {
        Some(_) => match require_admin_session(session).await {
            Ok(principal) => return Ok(principal),
            Err(e) => Some(e),
        },
        None => None,
    };

    if has_valid_internal_signature(method, path, headers) {
        tracing::info!(%method, path, "Internal admin call accepted");
        return Ok(AdminPrincipal::Internal);
    }

    Err(session_result.unwrap_or(AdminGuardError::Unauthorized))
}

/// True when `headers` carry a fresh internal signature for `method` and `path`.
pub fn has_valid_internal_signature(method: &Method, path: &str, headers: &HeaderMap) -> bool {
    headers
        .get(INTERNAL_ADMIN_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|signature| {
            verify_internal_signature(
                signature,
                &AUTH_SECRET,
                method,
                path,
                Utc::now().timestamp(),
                *INTERNAL_SIGNATURE_MAX_AGE_SECS,
            )
            .is_ok()
        })
}
