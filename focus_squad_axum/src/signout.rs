use axum::{
    Router,
    extract::Query,
    response::Redirect,
    routing::get,
};
use http::HeaderMap;
use serde::Deserialize;

use focus_squad::{FS_SIGNIN_PATH, FS_SIGNOUT_PATH, prepare_logout_response, sanitize_callback_path};

use super::error::{ErrorResponse, IntoResponseError};

/// Forced sign-out route at `FS_SIGNOUT_PATH`, the target of stale-session redirects.
pub fn signout_router() -> Router {
    Router::new().route(FS_SIGNOUT_PATH.as_str(), get(signout).post(signout))
}

#[derive(Deserialize)]
struct SignOutParams {
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

/// Ends the session, clears the session and version cookies, and redirects
/// to `callbackUrl` when it is a safe same-origin path.
async fn signout(
    headers: HeaderMap,
    Query(params): Query<SignOutParams>,
) -> Result<(HeaderMap, Redirect), ErrorResponse> {
    let response_headers = prepare_logout_response(&headers)
        .await
        .into_response_error()?;

    let target = params
        .callback_url
        .as_deref()
        .and_then(sanitize_callback_path)
        .unwrap_or_else(|| FS_SIGNIN_PATH.to_string());

    tracing::debug!(callback = %target, "Signed out");
    Ok((response_headers, Redirect::to(&target)))
}
