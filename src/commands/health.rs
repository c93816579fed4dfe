//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::commands::ApiResponse;
use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of all backend services
pub async fn get_health(State(state): State<Arc<AppState>>) -> ApiResponse<HealthResponse> {
    let mut health = HealthResponse::default();

    health.database = state.is_database_healthy();
    health.config = state.is_config_healthy();
    if let Ok(config) = state.get_config().await {
        health.provider = config.provider.to_string();
    }

    // Overall status
    health.status = if health.database && health.config {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    (StatusCode::OK, Json(CommandResponse::ok(health)))
}
