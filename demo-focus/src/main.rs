mod pages;
mod server;

use axum::{Router, middleware::from_fn, routing::get};
use dotenvy::dotenv;

use focus_squad_axum::{
    FS_LINK_PAGE_PATH, FS_SIGNIN_PATH, focus_squad_router, session_gate, signout_router,
};

use pages::{dashboard, link_page, signin_page, signin_submit};
use server::{init_tracing, spawn_http_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_focus");

    focus_squad_axum::init().await?;

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    tracing::warn!(
        "The sign-in page signs in any email without verification; use it for development only"
    );

    let pages = Router::new()
        .route("/", get(dashboard))
        .route(FS_LINK_PAGE_PATH.as_str(), get(link_page))
        .route(FS_SIGNIN_PATH.as_str(), get(signin_page).post(signin_submit))
        .layer(from_fn(session_gate));

    let app = pages
        .merge(signout_router())
        .nest("/api", focus_squad_router());

    spawn_http_server(port, app).await??;
    Ok(())
}
