//! Chat Proxy Command
//!
//! `POST /api/chat`. Unlike the other endpoints this one answers with the
//! provider's own envelope (or `{error}`), so existing chat-completion
//! clients can point at it unchanged.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use marketlens_llm::Message;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

/// Forward a chat request upstream with the server-held key.
///
/// A body that does not decode answers 500 `{error}` like any other
/// failure, never axum's plain-text rejection.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected chat request: {}", rejection.body_text());
            return internal_error();
        }
    };

    let proxy = match state.chat_proxy().await {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::error!("Chat proxy unavailable: {}", e);
            return internal_error();
        }
    };

    let reply = proxy.forward(&request.messages).await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body))
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}
