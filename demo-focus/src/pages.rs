use askama::Template;
use axum::{
    extract::{Form, Query},
    response::{Html, IntoResponse, Redirect, Response},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use focus_squad::{
    SessionError, SignInErrorInfo, create_session_for_account, get_live_status,
    resolve_sign_in_error, sanitize_callback_path,
};
use focus_squad_axum::{AuthUser, FS_SIGNIN_PATH, FS_SIGNOUT_PATH};

fn render(template: &impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template
        .render()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    label: &'a str,
    is_admin: bool,
    telegram_username: &'a str,
    live_status: String,
    signout_path: &'a str,
}

pub(crate) async fn dashboard(user: AuthUser) -> Result<Html<String>, (StatusCode, String)> {
    let live_status = match get_live_status().await {
        Ok(Some(status)) => status.status.to_string(),
        Ok(None) => "no session scheduled".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load live status");
            "unavailable".to_string()
        }
    };

    render(&DashboardTemplate {
        label: &user.label,
        is_admin: user.is_admin,
        telegram_username: user.telegram_username.as_deref().unwrap_or(""),
        live_status,
        signout_path: FS_SIGNOUT_PATH.as_str(),
    })
}

#[derive(Deserialize)]
pub(crate) struct LinkPageParams {
    t: Option<String>,
}

#[derive(Template)]
#[template(path = "link_telegram.html")]
struct LinkTemplate<'a> {
    linked: bool,
    telegram_username: &'a str,
    /// Bot-issued token from the button the bot sent
    bot_token: &'a str,
}

pub(crate) async fn link_page(
    user: AuthUser,
    Query(params): Query<LinkPageParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    render(&LinkTemplate {
        linked: user.telegram_linked,
        telegram_username: user.telegram_username.as_deref().unwrap_or(""),
        bot_token: params.t.as_deref().unwrap_or(""),
    })
}

#[derive(Deserialize)]
pub(crate) struct SignInParams {
    error: Option<String>,
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

#[derive(Template)]
#[template(path = "signin.html")]
struct SignInTemplate<'a> {
    error: Option<SignInErrorInfo>,
    callback_url: &'a str,
}

pub(crate) async fn signin_page(
    Query(params): Query<SignInParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let callback_url = params
        .callback_url
        .as_deref()
        .and_then(sanitize_callback_path)
        .unwrap_or_else(|| "/".to_string());

    render(&SignInTemplate {
        error: resolve_sign_in_error(params.error.as_deref()),
        callback_url: &callback_url,
    })
}

#[derive(Deserialize)]
pub(crate) struct SignInForm {
    email: String,
    label: Option<String>,
    callback_url: Option<String>,
}

/// Development stand-in for the identity layer: trusts the submitted email.
pub(crate) async fn signin_submit(Form(form): Form<SignInForm>) -> Response {
    let email = form.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Redirect::to(&format!("{}?error=EmailSignin", FS_SIGNIN_PATH.as_str()))
            .into_response();
    }
    let label = form
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(email);

    let headers: HeaderMap = match create_session_for_account(email, label).await {
        Ok((_, headers)) => headers,
        Err(SessionError::Blocked) => {
            return Redirect::to(&format!("{}?error=AccessDenied", FS_SIGNIN_PATH.as_str()))
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in failed");
            return Redirect::to(&format!("{}?error=Callback", FS_SIGNIN_PATH.as_str()))
                .into_response();
        }
    };

    let target = form
        .callback_url
        .as_deref()
        .and_then(sanitize_callback_path)
        .unwrap_or_else(|| "/".to_string());
    (headers, Redirect::to(&target)).into_response()
}
