use axum::{
    Json, Router,
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};

use focus_squad::{
    LinkInvite, SessionUser, confirm_bot_link, create_link_for_user, unlink_telegram,
};

use super::error::{ErrorResponse, IntoResponseError};
use super::session::AuthUser;

pub(super) fn router() -> Router {
    Router::new()
        .route("/link", post(create_link).delete(unlink))
        .route("/link/confirm", post(confirm_link))
}

/// Issues a one-time code and the bot deep link that carries it.
async fn create_link(auth_user: AuthUser) -> Result<Json<LinkInvite>, ErrorResponse> {
    create_link_for_user(&SessionUser::from(&auth_user))
        .await
        .map(Json)
        .into_response_error()
}

#[derive(Deserialize)]
struct ConfirmLinkRequest {
    token: String,
}

/// Binds the Telegram account named in a bot-issued token to the caller.
async fn confirm_link(
    auth_user: AuthUser,
    Json(payload): Json<ConfirmLinkRequest>,
) -> Result<Json<Value>, ErrorResponse> {
    let user = confirm_bot_link(&auth_user.id, &payload.token)
        .await
        .into_response_error()?;

    Ok(Json(json!({
        "telegram_user_id": user.telegram_user_id,
        "telegram_username": user.telegram_username,
    })))
}

async fn unlink(auth_user: AuthUser) -> Result<StatusCode, ErrorResponse> {
    unlink_telegram(&auth_user.id)
        .await
        .into_response_error()?;
    Ok(StatusCode::NO_CONTENT)
}
