//! Settings Commands
//!
//! Commands for reading and updating application settings.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::commands::{respond, ApiResponse};
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::state::AppState;

/// Get current application settings (with environment overrides applied)
pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResponse<AppConfig> {
    respond(state.get_config().await)
}

/// Update application settings with a partial update
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResponse<AppConfig> {
    respond(state.update_config(update).await)
}
