//! Chat Proxy Integration Tests
//!
//! The server-side relay that attaches the hosted-provider credential.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use marketlens::services::ChatProxy;
use marketlens_llm::Message;

use crate::support::{completion, spawn_chat_upstream, spawn_server};

fn messages() -> Vec<Message> {
    vec![
        Message::system("You are a compliance expert."),
        Message::user("Check compliance for organic tea brand"),
    ]
}

#[tokio::test]
async fn test_missing_key_answers_500_without_upstream_call() {
    let (upstream, hits) = spawn_chat_upstream(200, completion("unused")).await;
    let proxy = ChatProxy::new(upstream, "mixtral-8x7b-32768", None, Duration::from_secs(5));
    assert!(!proxy.has_credential());

    let reply = proxy.forward(&messages()).await;

    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, json!({ "error": "API key not configured" }));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_blank_key_counts_as_missing() {
    let (upstream, hits) = spawn_chat_upstream(200, completion("unused")).await;
    let proxy = ChatProxy::new(
        upstream,
        "mixtral-8x7b-32768",
        Some("  ".to_string()),
        Duration::from_secs(5),
    );

    let reply = proxy.forward(&messages()).await;

    assert_eq!(reply.status, 500);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_error_status_and_message_are_mirrored() {
    let (upstream, hits) =
        spawn_chat_upstream(429, json!({ "error": { "message": "rate limited" } })).await;
    let proxy = ChatProxy::new(
        upstream,
        "mixtral-8x7b-32768",
        Some("gsk-test".to_string()),
        Duration::from_secs(5),
    );

    let reply = proxy.forward(&messages()).await;

    assert_eq!(reply.status, 429);
    assert_eq!(reply.body, json!({ "error": "rate limited" }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_success_passes_envelope_and_sends_credential() {
    let seen: Arc<Mutex<Option<(String, Value)>>> = Arc::new(Mutex::new(None));
    let capture = seen.clone();
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let capture = capture.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                *capture.lock().unwrap() = Some((auth, request));
                Json(completion("1. Regulatory Framework"))
            }
        }),
    );
    let upstream = format!("{}/v1/chat/completions", spawn_server(router).await);
    let proxy = ChatProxy::new(
        upstream,
        "mixtral-8x7b-32768",
        Some("gsk-test".to_string()),
        Duration::from_secs(5),
    );

    let reply = proxy.forward(&messages()).await;

    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body["choices"][0]["message"]["content"],
        "1. Regulatory Framework"
    );

    let (auth, request) = seen.lock().unwrap().take().unwrap();
    assert_eq!(auth, "Bearer gsk-test");
    assert_eq!(request["model"], "mixtral-8x7b-32768");
    assert_eq!(request["max_tokens"], 4096);
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(request["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let proxy = ChatProxy::new(
        "http://127.0.0.1:9/v1/chat/completions",
        "mixtral-8x7b-32768",
        Some("gsk-test".to_string()),
        Duration::from_secs(2),
    );

    let reply = proxy.forward(&messages()).await;

    assert_eq!(reply.status, 502);
    assert_eq!(reply.body, json!({ "error": "Internal server error" }));
}
