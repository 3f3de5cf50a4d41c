//! Combined router for the Focus Squad API endpoints

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use focus_squad::{BotApi, RateLimiter, default_bot};

use super::middleware::{csrf_protect, rate_limit};

const API_RATE_LIMIT_GROUP: &str = "api";

/// Create the API router, to be nested under `/api`.
///
/// The endpoints will be available at:
/// - `GET /api/csrf`
/// - `POST|DELETE /api/link`, `POST /api/link/confirm`
/// - `GET /api/live-status`
/// - `POST /api/telegram/webhook`
/// - `/api/admin/...`
///
/// Everything except the webhook is CSRF protected and rate limited per client;
/// the webhook authenticates through `TELEGRAM_WEBHOOK_SECRET` instead. Bot
/// replies go through [`default_bot`].
pub fn focus_squad_router() -> Router {
    focus_squad_router_with_bot(default_bot())
}

/// Same as [`focus_squad_router`] with bot replies sent through `bot`.
pub fn focus_squad_router_with_bot(bot: Arc<dyn BotApi>) -> Router {
    let browser_routes = Router::new()
        .merge(super::csrf::router())
        .merge(super::link::router())
        .merge(super::telegram::router())
        .nest("/admin", super::admin::router())
        .layer(from_fn(csrf_protect))
        .layer(from_fn_with_state(
            RateLimiter::from_env(API_RATE_LIMIT_GROUP),
            rate_limit,
        ));

    Router::new()
        .merge(browser_routes)
        .merge(super::telegram::webhook_router(bot))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}
