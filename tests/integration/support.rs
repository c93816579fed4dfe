//! Stub servers and fixtures shared by the integration tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use marketlens::models::CacheKeyPolicy;
use marketlens::services::{
    AnalysisCache, AnalyticsClient, Dashboard, FeatureFetcher, ReportHistory, StoredInput,
};
use marketlens::storage::Database;
use marketlens_llm::{create_provider, ProviderConfig, ProviderType};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A chat-completions upstream that always answers `status` with `body`.
/// The returned counter records how many requests it received.
pub async fn spawn_chat_upstream(status: u16, body: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move |Json(_request): Json<Value>| {
            let counter = counter.clone();
            let body = body.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::from_u16(status).unwrap(), Json(body))
            }
        }),
    );
    let base = spawn_server(router).await;
    (format!("{}/v1/chat/completions", base), hits)
}

/// An analytics backend that answers every feature endpoint with `body`
/// after `delay`.
pub async fn spawn_analytics(body: Value, delay: Duration) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let handler = move |Json(_request): Json<Value>| {
        let counter = counter.clone();
        let body = body.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Json(body)
        }
    };
    let router = Router::new()
        .route("/api/icp-analysis", post(handler.clone()))
        .route("/api/competitor-analysis", post(handler.clone()))
        .route("/api/market-trends", post(handler.clone()))
        .route("/api/feedback-analysis", post(handler));
    (spawn_server(router).await, hits)
}

/// A completion envelope with a single choice.
pub fn completion(text: &str) -> Value {
    json!({
        "model": "llama3-70b-8192",
        "choices": [{ "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }]
    })
}

/// A complete ICP document.
pub fn icp_document() -> Value {
    json!({
        "demographics": { "age": "25-40" },
        "psychographics": { "values": ["health", "sustainability"] },
        "professional": { "roles": ["office workers"] },
        "pain_points": ["sugary drinks"],
        "additional_insights": "Buys online",
        "sources": ["survey"]
    })
}

/// Dashboard over the SQLite database at `path`, talking to a Groq-style
/// upstream at `chat_url` and an analytics backend at `analytics_url`.
pub fn dashboard_at(
    path: &Path,
    chat_url: &str,
    analytics_url: &str,
    timeout: Duration,
) -> (Arc<Dashboard>, Database) {
    let database = Database::open(path).unwrap();
    let store = Arc::new(database.clone());

    let provider = create_provider(ProviderConfig {
        api_key: Some("test-key".to_string()),
        base_url: Some(chat_url.to_string()),
        timeout_secs: timeout.as_secs().max(1),
        ..ProviderConfig::for_provider(ProviderType::Groq)
    });
    let analytics = Arc::new(AnalyticsClient::new(analytics_url, timeout));
    let fetcher = Arc::new(FeatureFetcher::new(provider, analytics));

    let input = Arc::new(StoredInput::load(store.clone()).unwrap());
    let cache = AnalysisCache::new(store.clone(), CacheKeyPolicy::Raw);
    let history = ReportHistory::new(store);
    let dashboard = Dashboard::new(input, cache, history, fetcher, timeout, false);
    (Arc::new(dashboard), database)
}
