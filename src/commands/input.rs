//! Stored Input Commands
//!
//! Read and replace the business description every feature analyses.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::commands::{respond, ApiResponse};
use crate::models::response::InputUpdate;
use crate::state::AppState;
use crate::utils::error::AppResult;

/// Get the stored business input (`""` if never set)
pub async fn get_input(State(state): State<Arc<AppState>>) -> ApiResponse<String> {
    respond(read_input(&state).await)
}

/// Replace the stored business input
pub async fn update_input(
    State(state): State<Arc<AppState>>,
    Json(update): Json<InputUpdate>,
) -> ApiResponse<String> {
    respond(write_input(&state, update.value).await)
}

async fn read_input(state: &AppState) -> AppResult<String> {
    let dashboard = state.dashboard().await?;
    Ok(dashboard.stored_input().read())
}

async fn write_input(state: &AppState, value: String) -> AppResult<String> {
    let dashboard = state.dashboard().await?;
    dashboard.set_input(&value)?;
    Ok(value)
}
