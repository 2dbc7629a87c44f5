//! HTTP surface: one route per handler, each accepting a single method.

pub mod analyze;
pub mod compatibility;
mod error;
pub mod profiles;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::app::App;
use crate::{Error, Result};

/// Base64 screenshots routinely exceed axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

pub fn router(app: App) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            post(analyze::analyze).fallback(method_not_allowed),
        )
        .route(
            "/api/save-profile",
            post(profiles::save_profile).fallback(method_not_allowed),
        )
        .route(
            "/api/get-profile",
            get(profiles::get_profile).fallback(method_not_allowed),
        )
        .route(
            "/api/compatibility",
            post(compatibility::compatibility).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Serves the router until Ctrl+C.
pub async fn serve(listener: TcpListener, app: App) -> Result<()> {
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
