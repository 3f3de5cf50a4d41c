use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::headers::{self, HeaderMapExt};
use http::{
    HeaderMap, HeaderValue, StatusCode,
    header::{RETRY_AFTER, SET_COOKIE},
};

use focus_squad::{
    GateDecision, GateRequest, GateSession, RateLimiter, SESSION_VERSION_COOKIE_NAME, SessionState, client_key, current_session_version,
    evaluate_gate, is_public_path, is_state_changing, resolve_session,
    has_valid_internal_signature, session_version_cookie_header, verify_csrf_request,
};

use super::error::{ErrorResponse, IntoResponseError};
use super::session::AuthUser;

fn append_set_cookies(response: &mut Response, headers: &HeaderMap) {
    for value in headers.get_all(SET_COOKIE) {
        response.headers_mut().append(SET_COOKIE, value.clone());
    }
}

/// Page gate: redirects anonymous, blocked, stale and unlinked users, and
/// lets everyone else through with the resolved [`AuthUser`] in the request
/// extensions.
///
/// Rotated session cookies are sent with whatever response the request ends in.
pub async fn session_gate(mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if is_public_path(&path) {
        return next.run(req).await;
    }

    let state = match resolve_session(req.headers()).await {
        Ok(state) => state,
        Err(e) => return ErrorResponse::internal(e).into_response(),
    };

    let current_version = match &state {
        SessionState::Active {
            current_version, ..
        } => *current_version,
        _ => match current_session_version().await {
            Ok(version) => version,
            Err(e) => return ErrorResponse::internal(e).into_response(),
        },
    };

    let (session, rotated_headers) = match &state {
        SessionState::Anonymous => (GateSession::Anonymous, None),
        SessionState::Blocked { .. } => (GateSession::Blocked, None),
        SessionState::Active {
            user,
            session_version,
            rotated_headers,
            ..
        } => (
            GateSession::Active {
                telegram_linked: user.telegram_linked,
                session_version: *session_version,
            },
            rotated_headers.clone(),
        ),
    };

    let cookies = req.headers().typed_get::<headers::Cookie>();
    let sv_cookie = cookies
        .as_ref()
        .and_then(|c| c.get(SESSION_VERSION_COOKIE_NAME.as_str()));
    let query = req.uri().query().map(str::to_string);

    let decision = evaluate_gate(&GateRequest {
        path: &path,
        query: query.as_deref(),
        session,
        sv_cookie,
        current_version,
    });
    tracing::debug!(path = %path, ?decision, "Session gate decision");

    let mut response = match decision {
        GateDecision::Public => next.run(req).await,
        GateDecision::Authorized { set_sv_cookie } => {
            if let Some(user) = state.user() {
                req.extensions_mut().insert(AuthUser::from(user.clone()));
            }
            let mut response = next.run(req).await;
            if let Some(version) = set_sv_cookie {
                match session_version_cookie_header(version) {
                    Ok(headers) => append_set_cookies(&mut response, &headers),
                    Err(e) => tracing::error!(error = %e, "Failed to build session version cookie"),
                }
            }
            response
        }
        GateDecision::Unauthenticated { redirect }
        | GateDecision::Blocked { redirect }
        | GateDecision::StaleSession { redirect }
        | GateDecision::NeedsTelegramLink { redirect } => {
            Redirect::temporary(&redirect).into_response()
        }
    };

    if let Some(headers) = rotated_headers {
        append_set_cookies(&mut response, &headers);
    }
    response
}

/// Double-submit CSRF check for state-changing requests.
///
/// Machine callers with a valid internal admin signature for this method and
/// path skip the check. The signature is verified against the path before any
/// `nest` prefix was stripped, matching what the admin guard checks.
pub async fn csrf_protect(req: Request, next: Next) -> Response {
    if !is_state_changing(req.method()) {
        return next.run(req).await;
    }

    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.path())
        .unwrap_or_else(|| req.uri().path());
    if has_valid_internal_signature(req.method(), path, req.headers()) {
        return next.run(req).await;
    }

    if let Err(err) = verify_csrf_request(req.headers()).into_response_error() {
        tracing::warn!(
            method = %req.method(),
            path = req.uri().path(),
            "Rejected request failing the CSRF check"
        );
        return err.into_response();
    }
    next.run(req).await
}

/// Per-client request limit. Answers 429 with `Retry-After` once exceeded.
///
/// Use with [`axum::middleware::from_fn_with_state`]. When the counter store is
/// unavailable the request is let through.
pub async fn rate_limit(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let key = client_key(req.headers());

    match limiter.check(&key).await {
        Ok(decision) if !decision.allowed => {
            let mut response =
                ErrorResponse::new(StatusCode::TOO_MANY_REQUESTS, "too many requests")
                    .into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(decision.retry_after_secs));
            response
        }
        Ok(_) => next.run(req).await,
        Err(e) => {
            tracing::error!(error = %e, "Rate limiter unavailable, letting request through");
            next.run(req).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_AUTH_SECRET, init_test_environment, sign_in, unique_email};
    use axum::{
        Router,
        body::Body,
        middleware::{from_fn, from_fn_with_state},
        routing::{get, post},
    };
    use focus_squad::{
        CSRF_COOKIE_NAME, CSRF_HEADER_NAME, INTERNAL_ADMIN_SIGNATURE_HEADER, SESSION_COOKIE_NAME,
        TelegramIdentity, consume_link_code, create_link_for_user, sign_internal_request,
    };
    use http::{
        Request,
        header::{COOKIE, LOCATION},
    };
    use serial_test::serial;
    use tower::ServiceExt;

    async fn dashboard(user: AuthUser) -> String {
        format!("dashboard for {}", user.email)
    }

    fn gated_app() -> Router {
        Router::new()
            .route("/dashboard", get(dashboard))
            .route("/link-telegram", get(|| async { "link page" }))
            .route("/api/ping", get(|| async { "pong" }))
            .layer(from_fn(session_gate))
    }

    fn session_cookie(cookie: &str) -> String {
        cookie
            .split("; ")
            .find(|part| part.starts_with(SESSION_COOKIE_NAME.as_str()))
            .unwrap()
            .to_string()
    }

    async fn linked_user_cookie(tag: &str, telegram_user_id: i64) -> String {
        let (user, cookie) = sign_in(&unique_email(tag)).await;
        let invite = create_link_for_user(&user).await.unwrap();
        consume_link_code(
            &invite.code,
            &TelegramIdentity {
                telegram_user_id,
                telegram_username: None,
            },
        )
        .await
        .unwrap();
        cookie
    }

    async fn get_with_cookie(app: Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_gate_redirects_anonymous_to_sign_in() {
        init_test_environment().await;

        let response = get_with_cookie(gated_app(), "/dashboard?tab=today", None).await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "/auth/signin?callbackUrl=%2Fdashboard%3Ftab%3Dtoday"
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_gate_passes_api_paths() {
        init_test_environment().await;

        let response = get_with_cookie(gated_app(), "/api/ping", None).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn test_gate_sends_unlinked_user_to_link_page() {
        init_test_environment().await;
        let (_, cookie) = sign_in(&unique_email("unlinked")).await;

        let response = get_with_cookie(gated_app(), "/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/link-telegram");

        let response = get_with_cookie(gated_app(), "/link-telegram", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn test_gate_sets_missing_version_cookie() {
        init_test_environment().await;
        let cookie = linked_user_cookie("sv-missing", 5001).await;
        let version = current_session_version().await.unwrap();

        let response =
            get_with_cookie(gated_app(), "/dashboard", Some(&session_cookie(&cookie))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{}=", SESSION_VERSION_COOKIE_NAME.as_str())))
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with(&format!(
            "{}={version};",
            SESSION_VERSION_COOKIE_NAME.as_str()
        )));
        assert!(set_cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    #[serial]
    async fn test_gate_passes_current_version_cookie() {
        init_test_environment().await;
        let cookie = linked_user_cookie("sv-current", 5002).await;

        let response = get_with_cookie(gated_app(), "/dashboard", Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_gate_forces_sign_out_on_stale_version_cookie() {
        init_test_environment().await;
        let cookie = linked_user_cookie("sv-stale", 5003).await;
        let stale = format!(
            "{}; {}=stale",
            session_cookie(&cookie),
            SESSION_VERSION_COOKIE_NAME.as_str()
        );

        let response = get_with_cookie(gated_app(), "/dashboard", Some(&stale)).await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "/auth/signout?callbackUrl=%2Fauth%2Fsignin"
        );
    }

    fn csrf_app() -> Router {
        Router::new()
            .route("/submit", post(|| async { "ok" }).get(|| async { "read" }))
            .layer(from_fn(csrf_protect))
    }

    async fn post_submit(headers: &[(&str, String)]) -> StatusCode {
        let mut builder = Request::post("/submit");
        for (name, value) in headers {
            builder = builder.header(*name, value);
        }
        csrf_app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_csrf_rejects_missing_or_mismatched_token() {
        let cookie = format!("{}=abc123", CSRF_COOKIE_NAME.as_str());

        assert_eq!(post_submit(&[]).await, StatusCode::FORBIDDEN);
        assert_eq!(
            post_submit(&[("cookie", cookie.clone())]).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            post_submit(&[
                ("cookie", cookie),
                (CSRF_HEADER_NAME.as_str(), "abc124".to_string())
            ])
            .await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_csrf_accepts_matching_token() {
        let status = post_submit(&[
            ("cookie", format!("{}=abc123", CSRF_COOKIE_NAME.as_str())),
            (CSRF_HEADER_NAME.as_str(), "abc123".to_string()),
        ])
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_csrf_skips_safe_methods() {
        let response = csrf_app()
            .oneshot(Request::get("/submit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn test_csrf_exempts_only_valid_internal_signatures() {
        init_test_environment().await;
        let now = chrono::Utc::now().timestamp();
        let signed = |method: &http::Method, path: &str, at: i64| {
            sign_internal_request(TEST_AUTH_SECRET.as_bytes(), method, path, at)
        };

        let valid = signed(&http::Method::POST, "/submit", now);
        assert_eq!(
            post_submit(&[(INTERNAL_ADMIN_SIGNATURE_HEADER, valid)]).await,
            StatusCode::OK
        );

        let rejected = [
            "t=1,v1=00".to_string(),
            format!("t={},v1=00", i64::MIN),
            signed(&http::Method::POST, "/elsewhere", now),
            signed(&http::Method::POST, "/submit", now - 3_600),
        ];
        for header in rejected {
            assert_eq!(
                post_submit(&[(INTERNAL_ADMIN_SIGNATURE_HEADER, header.clone())]).await,
                StatusCode::FORBIDDEN,
                "exempted {header:?}"
            );
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_rate_limit_denies_after_max() {
        init_test_environment().await;
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(
                RateLimiter::new("middleware-test", 2, 60),
                rate_limit,
            ));
        let client = "203.0.113.7";

        let mut statuses = Vec::new();
        let mut last = None;
        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(
                    Request::get("/ping")
                        .header("x-forwarded-for", client)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            statuses.push(response.status());
            last = Some(response);
        }

        assert_eq!(
            statuses,
            vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
        );
        let retry_after: u64 = last
            .unwrap()
            .headers()
            .get(RETRY_AFTER)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));
    }
}
