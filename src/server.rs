//! HTTP Server
//!
//! Routes the API onto the command handlers and runs the axum server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::commands;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Build the API router over `state`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(commands::get_health))
        .route(
            "/api/input",
            get(commands::get_input).put(commands::update_input),
        )
        .route("/api/analysis", get(commands::list_analyses))
        .route(
            "/api/analysis/:feature",
            get(commands::get_analysis).post(commands::run_analysis),
        )
        .route(
            "/api/analysis/:feature/reports",
            get(commands::list_reports).delete(commands::clear_reports),
        )
        .route(
            "/api/settings",
            get(commands::get_settings).put(commands::update_settings),
        )
        .route("/api/features", get(commands::list_features))
        .route("/api/chat", axum::routing::post(commands::chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` resolves
pub async fn serve<F>(state: Arc<AppState>, addr: &str, shutdown: F) -> AppResult<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| AppError::config(format!("Invalid bind address {}: {}", addr, e)))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("MarketLens API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
