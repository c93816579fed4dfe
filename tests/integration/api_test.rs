//! HTTP API Integration Tests
//!
//! Runs the real router on an ephemeral port. Prompt-driven analyses go
//! through the provider adapter to this server's own `/api/chat`, which
//! forwards to a stub upstream.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::{json, Value};

use marketlens::models::ProviderSecrets;
use marketlens::server;
use marketlens::state::AppState;
use marketlens::storage::{ConfigService, Database};

use crate::support::{completion, spawn_chat_upstream, spawn_server};

struct TestApi {
    base: String,
    client: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl TestApi {
    async fn start(secrets: ProviderSecrets) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(dir.path().join("marketlens.db")).unwrap();
        let config = ConfigService::open(dir.path().join("config.json")).unwrap();

        let state = Arc::new(AppState::new(secrets));
        state.initialize_with(database, config).await.unwrap();
        let base = spawn_server(server::router(state)).await;

        Self {
            base,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .request(method, format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }
}

fn secrets_with_groq_key() -> ProviderSecrets {
    ProviderSecrets {
        groq_api_key: Some("gsk-test".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_health_reports_service() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (status, body) = api.get("/api/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "marketlens");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_input_round_trip() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (_, empty) = api.get("/api/input").await;
    assert_eq!(empty["data"], "");

    let (status, _) = api
        .send(
            reqwest::Method::PUT,
            "/api/input",
            json!({ "value": "organic tea brand" }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, stored) = api.get("/api/input").await;
    assert_eq!(stored["data"], "organic tea brand");
}

#[tokio::test]
async fn test_unknown_feature_is_not_found() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (status, body) = api.get("/api/analysis/pricing").await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("pricing"));
}

#[tokio::test]
async fn test_feature_catalogue() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (_, body) = api.get("/api/features").await;
    let features = body["data"].as_array().unwrap();

    assert_eq!(features.len(), 11);
    let icp = features.iter().find(|f| f["slug"] == "icp").unwrap();
    assert_eq!(icp["source"], "backend");
    assert_eq!(icp["endpoint"], "/api/icp-analysis");
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (status, body) = api
        .send(
            reqwest::Method::PUT,
            "/api/settings",
            json!({ "request_timeout_secs": 0 }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (_, settings) = api.get("/api/settings").await;
    assert_ne!(settings["data"]["request_timeout_secs"], 0);
}

#[tokio::test]
async fn test_chat_route_without_key() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (status, body) = api
        .send(
            reqwest::Method::POST,
            "/api/chat",
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        )
        .await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "API key not configured" }));
}

#[tokio::test]
async fn test_chat_route_malformed_body_keeps_error_shape() {
    let api = TestApi::start(secrets_with_groq_key()).await;

    let response = api
        .client
        .post(format!("{}/api/chat", api.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal server error" }));

    let (status, body) = api
        .send(reqwest::Method::POST, "/api/chat", json!({ "prompt": "hi" }))
        .await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_compliance_through_own_chat_proxy() {
    let (upstream, hits) = spawn_chat_upstream(
        200,
        completion("1. Regulatory Framework\n2. Required Certifications"),
    )
    .await;
    let api = TestApi::start(secrets_with_groq_key()).await;

    // Point the proxy backend at this server and its relay at the stub.
    let (status, _) = api
        .send(
            reqwest::Method::PUT,
            "/api/settings",
            json!({
                "provider": "proxy",
                "chat_proxy_url": format!("{}/api/chat", api.base),
                "upstream_chat_url": upstream,
            }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, empty) = api
        .send(reqwest::Method::POST, "/api/analysis/compliance", json!({}))
        .await;
    assert_eq!(empty["data"]["outcome"], "empty_input");
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    api.send(
        reqwest::Method::PUT,
        "/api/input",
        json!({ "value": "organic tea brand" }),
    )
    .await;

    let (status, body) = api
        .send(reqwest::Method::POST, "/api/analysis/compliance", json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["outcome"], "fetched");
    assert_eq!(body["data"]["state"]["status"], "success");
    assert_eq!(body["data"]["state"]["result"]["kind"], "text");
    assert!(body["data"]["state"]["result"]["content"]
        .as_str()
        .unwrap()
        .starts_with("1. Regulatory Framework"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let (_, again) = api
        .send(reqwest::Method::POST, "/api/analysis/compliance", json!({}))
        .await;
    assert_eq!(again["data"]["outcome"], "cache_hit");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let (_, listed) = api.get("/api/analysis").await;
    let compliance = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["feature"] == "compliance")
        .unwrap()
        .clone();
    assert_eq!(compliance["state"]["status"], "success");

    // Only the network fetch was saved, not the cache hit.
    let (status, reports) = api.get("/api/analysis/compliance/reports").await;
    assert_eq!(status, 200);
    let saved = reports["data"].as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["input"], "organic tea brand");
    assert_eq!(saved[0]["result"]["kind"], "text");

    let (status, cleared) = api
        .send(
            reqwest::Method::DELETE,
            "/api/analysis/compliance/reports",
            json!({}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(cleared["data"], 1);

    let (_, reports) = api.get("/api/analysis/compliance/reports").await;
    assert!(reports["data"].as_array().unwrap().is_empty());

    // The cached analysis is separate from the history.
    let (_, current) = api.get("/api/analysis/compliance").await;
    assert_eq!(current["data"]["state"]["status"], "success");
}

#[tokio::test]
async fn test_reports_of_unknown_feature_are_not_found() {
    let api = TestApi::start(ProviderSecrets::default()).await;

    let (status, body) = api.get("/api/analysis/pricing/reports").await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
}
