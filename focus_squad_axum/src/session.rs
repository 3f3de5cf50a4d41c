use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum_extra::headers::{Cookie, HeaderMapExt};
use chrono::{DateTime, Utc};
use http::{StatusCode, request::Parts};

use focus_squad::{SESSION_COOKIE_NAME, SessionUser, get_user_from_session};

use super::error::{ErrorResponse, IntoResponseError};

/// The signed-in learner or admin behind a request
///
/// Every extraction re-reads the session: an expired session, one minted
/// before the last session reset, or a blocked account all fail. When
/// `session_gate` already resolved the user, that copy is reused.
///
/// Fails with `401 {"error": "unauthorized"}`, or `403` when the account is blocked.
/// Take `Option<AuthUser>` for routes that also serve anonymous visitors.
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use focus_squad_axum::AuthUser;
///
/// async fn my_streak(user: AuthUser) -> String {
///     format!("{} is signed in", user.label)
/// }
///
/// let app: Router = Router::new().route("/streak", get(my_streak));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub label: String,
    /// As read with the session; `/admin` routes look the row up again
    pub is_admin: bool,
    pub telegram_linked: bool,
    pub telegram_username: Option<String>,
    pub sequence_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionUser> for AuthUser {
    fn from(user: SessionUser) -> Self {
        let SessionUser {
            id,
            email,
            label,
            is_admin,
            telegram_linked,
            telegram_username,
            sequence_number,
            created_at,
            updated_at,
            ..
        } = user;
        Self {
            id,
            email,
            label,
            is_admin,
            telegram_linked,
            telegram_username,
            sequence_number,
            created_at,
            updated_at,
        }
    }
}

impl From<&AuthUser> for SessionUser {
    fn from(user: &AuthUser) -> Self {
        user.clone().into_session_user()
    }
}

impl AuthUser {
    // Blocked accounts never produce an AuthUser.
    fn into_session_user(self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email,
            label: self.label,
            is_admin: self.is_admin,
            is_blocked: false,
            telegram_linked: self.telegram_linked,
            telegram_username: self.telegram_username,
            sequence_number: self.sequence_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    async fn resolve(parts: &Parts) -> Result<Self, ErrorResponse> {
        let session_id = parts
            .headers
            .typed_get::<Cookie>()
            .and_then(|cookies| cookies.get(SESSION_COOKIE_NAME.as_str()).map(str::to_owned))
            .ok_or_else(|| {
                tracing::debug!("Request carries no session cookie");
                ErrorResponse::new(StatusCode::UNAUTHORIZED, "unauthorized")
            })?;

        get_user_from_session(&session_id)
            .await
            .into_response_error()
            .map(Self::from)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<AuthUser>() {
            return Ok(resolved.clone());
        }

        let user = Self::resolve(parts).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_environment, sign_in, unique_email};
    use axum::{Router, body::Body, routing::get};
    use http::{Request, header::COOKIE};
    use serial_test::serial;
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.email
    }

    async fn maybe(user: Option<AuthUser>) -> String {
        user.map(|u| u.email).unwrap_or_else(|| "anonymous".to_string())
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/maybe", get(maybe))
    }

    #[test]
    fn test_session_user_round_trip() {
        let now = Utc::now();
        let session_user = SessionUser {
            id: "user123".to_string(),
            email: "learner@focus-squad.test".to_string(),
            label: "Learner".to_string(),
            is_admin: true,
            is_blocked: false,
            telegram_linked: true,
            telegram_username: Some("learner".to_string()),
            sequence_number: 42,
            created_at: now,
            updated_at: now,
        };

        let auth_user = AuthUser::from(session_user.clone());
        assert_eq!(auth_user.email, "learner@focus-squad.test");
        assert!(auth_user.telegram_linked);
        assert_eq!(SessionUser::from(&auth_user), session_user);
    }

    #[tokio::test]
    #[serial]
    async fn test_extractor_requires_session() {
        init_test_environment().await;

        let response = app()
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn test_extractor_resolves_signed_in_user() {
        init_test_environment().await;
        let email = unique_email("whoami");
        let (_, cookie) = sign_in(&email).await;

        let response = app()
            .oneshot(
                Request::get("/whoami")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, email.as_bytes());
    }

    #[tokio::test]
    #[serial]
    async fn test_optional_extractor_allows_anonymous() {
        init_test_environment().await;

        let response = app()
            .oneshot(
                Request::get("/maybe")
                    .header(COOKIE, format!("{}=unknown", SESSION_COOKIE_NAME.as_str()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, "anonymous".as_bytes());
    }
}
