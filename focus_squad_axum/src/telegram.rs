use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use http::HeaderMap;
use serde_json::{Value, json};

use focus_squad::{BotApi, Update, get_live_status, handle_update, verify_webhook_secret};

use super::error::{ErrorResponse, IntoResponseError};
use super::session::AuthUser;

const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

pub(super) fn webhook_router(bot: Arc<dyn BotApi>) -> Router {
    Router::new()
        .route("/telegram/webhook", post(webhook))
        .with_state(bot)
}

pub(super) fn router() -> Router {
    Router::new().route("/live-status", get(live_status))
}

/// Telegram delivers updates here. Anything past the secret check is answered
/// with 200 so Telegram does not redeliver it.
async fn webhook(
    State(bot): State<Arc<dyn BotApi>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ErrorResponse> {
    let secret = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    verify_webhook_secret(secret).into_response_error()?;

    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            let outcome = handle_update(&update, bot.as_ref()).await;
            tracing::debug!(?outcome, "Telegram update handled");
        }
        Err(e) => tracing::warn!(error = %e, "Ignoring unparseable Telegram update"),
    }

    Ok(Json(json!({ "ok": true })))
}

async fn live_status(_auth_user: AuthUser) -> Result<Json<Value>, ErrorResponse> {
    let status = get_live_status().await.into_response_error()?;
    Ok(Json(json!({ "live_status": status })))
}
