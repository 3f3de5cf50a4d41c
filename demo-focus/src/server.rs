use axum::Router;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Serves `app` on all interfaces; the handle resolves when the listener stops.
pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<std::io::Result<()>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tokio::spawn(async move {
        tracing::info!(%addr, "Focus Squad demo listening");
        axum_server::bind(addr).serve(app.into_make_service()).await
    })
}

fn default_filter(app_name: &str) -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new(format!(
            "focus_squad=debug,focus_squad_axum=debug,{app_name}=debug,tower_http=debug,info"
        ))
    } else {
        EnvFilter::new("info")
    }
}

/// `RUST_LOG` wins over the built-in filter.
pub(crate) fn init_tracing(app_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(app_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
