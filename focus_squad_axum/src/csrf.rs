use axum::{Json, Router, routing::get};
use http::HeaderMap;
use serde_json::{Value, json};

use focus_squad::{csrf_cookie_header, generate_csrf_token};

use super::error::{ErrorResponse, IntoResponseError};

pub(super) fn router() -> Router {
    Router::new().route("/csrf", get(issue_csrf_token))
}

/// Issues a fresh double-submit token as a readable cookie and in the body.
async fn issue_csrf_token() -> Result<(HeaderMap, Json<Value>), ErrorResponse> {
    let token = generate_csrf_token().into_response_error()?;
    let headers = csrf_cookie_header(&token).into_response_error()?;
    Ok((headers, Json(json!({ "csrf_token": token }))))
}
