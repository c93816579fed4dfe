//! HTTP Commands
//!
//! Axum handlers for the MarketLens API. Every handler except the chat
//! proxy answers with the `{success, data, error}` envelope.

pub mod analysis;
pub mod chat;
pub mod features;
pub mod health;
pub mod input;
pub mod settings;

pub use analysis::*;
pub use chat::*;
pub use features::*;
pub use health::*;
pub use input::*;
pub use settings::*;

use axum::http::StatusCode;
use axum::Json;

use crate::models::response::CommandResponse;
use crate::utils::error::{AppError, AppResult};

/// Handler return type: status code plus the JSON envelope
pub type ApiResponse<T> = (StatusCode, Json<CommandResponse<T>>);

/// HTTP status for an application error
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) | AppError::Serialization(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Core(core) => match core {
            marketlens_core::CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            marketlens_core::CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wrap a result in the response envelope
pub fn respond<T>(result: AppResult<T>) -> ApiResponse<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(CommandResponse::ok(data))),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Request failed: {}", e);
            }
            (status, Json(CommandResponse::err(e.to_string())))
        }
    }
}
