// HTTP surface - thin adapters from JSON requests to LedgerService calls.

pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::LedgerService;

pub use error::ApiError;

/// Build the API router around a shared service handle.
pub fn router(service: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/users/:username", get(handlers::get_user))
        .route("/reward", post(handlers::reward_points))
        .route("/redeem", post(handlers::redeem_points))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(service: Arc<LedgerService>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    service.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
}
