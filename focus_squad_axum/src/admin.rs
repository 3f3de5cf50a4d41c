use axum::{
    Json, Router,
    extract::{FromRequestParts, OptionalFromRequestParts, OriginalUri, Path},
    http::StatusCode,
    routing::{delete, get, post},
};
use http::request::Parts;
use serde::Deserialize;
use serde_json::{Value, json};

use focus_squad::{
    AdminPrincipal, SessionUser, User, delete_user_account, list_users, require_admin_or_internal,
    reset_session_version, set_user_admin, set_user_blocked,
};

use super::error::{ErrorResponse, IntoResponseError};
use super::session::AuthUser;

pub(super) fn router() -> Router {
    Router::new()
        .route("/users", get(list_users_handler))
        .route("/users/{user_id}", delete(delete_user_handler))
        .route("/users/{user_id}/admin", post(set_admin_handler))
        .route("/users/{user_id}/blocked", post(set_blocked_handler))
        .route("/session/reset", post(reset_session_handler))
}

/// A caller that passed the admin guard: a signed-in admin, or a machine
/// caller with a valid internal signature for this method and path.
pub struct AdminCaller(pub AdminPrincipal);

impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_user =
            <AuthUser as OptionalFromRequestParts<S>>::from_request_parts(parts, state).await?;
        let session_user = auth_user.as_ref().map(SessionUser::from);

        // Signatures cover the full path, not the one left after nesting.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let principal = require_admin_or_internal(
            &parts.method,
            &path,
            &parts.headers,
            session_user.as_ref(),
        )
        .await
        .into_response_error()?;

        Ok(Self(principal))
    }
}

async fn list_users_handler(_: AdminCaller) -> Result<Json<Vec<User>>, ErrorResponse> {
    list_users().await.map(Json).into_response_error()
}

#[derive(Deserialize)]
struct AdminFlagRequest {
    is_admin: bool,
}

async fn set_admin_handler(
    AdminCaller(actor): AdminCaller,
    Path(user_id): Path<String>,
    Json(payload): Json<AdminFlagRequest>,
) -> Result<Json<User>, ErrorResponse> {
    set_user_admin(&actor, &user_id, payload.is_admin)
        .await
        .map(Json)
        .into_response_error()
}

#[derive(Deserialize)]
struct BlockedFlagRequest {
    is_blocked: bool,
}

async fn set_blocked_handler(
    AdminCaller(actor): AdminCaller,
    Path(user_id): Path<String>,
    Json(payload): Json<BlockedFlagRequest>,
) -> Result<Json<User>, ErrorResponse> {
    set_user_blocked(&actor, &user_id, payload.is_blocked)
        .await
        .map(Json)
        .into_response_error()
}

async fn delete_user_handler(
    AdminCaller(actor): AdminCaller,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    delete_user_account(&actor, &user_id)
        .await
        .into_response_error()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Signs every user out by bumping the global session version.
async fn reset_session_handler(
    AdminCaller(actor): AdminCaller,
) -> Result<Json<Value>, ErrorResponse> {
    let session_version = reset_session_version().await.into_response_error()?;
    tracing::info!(actor = ?actor.user_id(), session_version, "Session version reset");
    Ok(Json(json!({ "session_version": session_version })))
}
