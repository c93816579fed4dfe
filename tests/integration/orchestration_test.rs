//! Orchestration Integration Tests
//!
//! Dashboard → orchestrator → provider/analytics client → stub server, with
//! results cached in a real SQLite file.

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use marketlens::models::{AnalysisError, AnalysisResult, AnalysisState, TriggerOutcome};
use marketlens_core::Feature;

use crate::support::{
    completion, dashboard_at, icp_document, spawn_analytics, spawn_chat_upstream,
};

const TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Prompt-driven features
// ============================================================================

#[tokio::test]
async fn test_compliance_result_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("marketlens.db");
    let (chat_url, chat_hits) =
        spawn_chat_upstream(200, completion("1. Regulatory Framework\nFood labelling rules")).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::ZERO).await;

    {
        let (dashboard, database) = dashboard_at(&db_path, &chat_url, &analytics_url, TIMEOUT);
        dashboard.set_input("organic tea brand").unwrap();

        let (outcome, state) = dashboard
            .analyze(Feature::Compliance, false, CancellationToken::new())
            .await;
        assert_eq!(outcome, TriggerOutcome::Fetched);
        match state {
            AnalysisState::Success {
                result, from_cache, ..
            } => {
                assert!(!from_cache);
                assert!(result.as_text().unwrap().starts_with("1. Regulatory Framework"));
            }
            other => panic!("expected success, got {:?}", other),
        }

        let stored = database
            .get_entry("complianceAnalysis_organic tea brand")
            .unwrap();
        assert!(stored.is_some());
    }

    // Fresh process over the same database file.
    let (dashboard, _database) = dashboard_at(&db_path, &chat_url, &analytics_url, TIMEOUT);
    let input = dashboard.stored_input().read();
    assert_eq!(input, "organic tea brand");

    dashboard.refresh_for_input(&input).await;
    match dashboard.state(Feature::Compliance).await {
        AnalysisState::Success {
            result, from_cache, ..
        } => {
            assert!(from_cache);
            assert!(result.as_text().unwrap().contains("Food labelling rules"));
        }
        other => panic!("expected cached success, got {:?}", other),
    }
    assert_eq!(chat_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_trigger_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, chat_hits) = spawn_chat_upstream(200, completion("Strengths: loyal buyers")).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::ZERO).await;
    let (dashboard, _database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);
    dashboard.set_input("organic tea brand").unwrap();

    let (first, _) = dashboard
        .analyze(Feature::Swot, false, CancellationToken::new())
        .await;
    let (second, state) = dashboard
        .analyze(Feature::Swot, false, CancellationToken::new())
        .await;

    assert_eq!(first, TriggerOutcome::Fetched);
    assert_eq!(second, TriggerOutcome::CacheHit);
    assert_eq!(
        state.result(),
        Some(&AnalysisResult::Text("Strengths: loyal buyers".to_string()))
    );
    assert_eq!(chat_hits.load(Ordering::SeqCst), 1);

    // A forced refresh goes back to the network.
    let (third, _) = dashboard
        .analyze(Feature::Swot, true, CancellationToken::new())
        .await;
    assert_eq!(third, TriggerOutcome::Fetched);
    assert_eq!(chat_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_zero_choices_fails_without_caching() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, _) = spawn_chat_upstream(200, json!({ "choices": [] })).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::ZERO).await;
    let (dashboard, _database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);
    dashboard.set_input("organic tea brand").unwrap();

    let (outcome, state) = dashboard
        .analyze(Feature::Compliance, false, CancellationToken::new())
        .await;

    assert_eq!(outcome, TriggerOutcome::Failed);
    assert!(matches!(
        state,
        AnalysisState::Failure {
            error: AnalysisError::Provider(_),
            ..
        }
    ));
    assert_eq!(dashboard.cache().count(Feature::Compliance).unwrap(), 0);
}

#[tokio::test]
async fn test_rate_limit_message_reaches_the_user() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, _) =
        spawn_chat_upstream(429, json!({ "error": { "message": "rate limited" } })).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::ZERO).await;
    let (dashboard, _database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);
    dashboard.set_input("organic tea brand").unwrap();

    let (_, state) = dashboard
        .analyze(Feature::RiskAssessment, false, CancellationToken::new())
        .await;

    let message = state.error_message().unwrap();
    assert!(message.contains("rate limited"), "got: {}", message);
    assert_eq!(dashboard.cache().count(Feature::RiskAssessment).unwrap(), 0);
}

#[tokio::test]
async fn test_empty_input_makes_no_request() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, chat_hits) = spawn_chat_upstream(200, completion("unused")).await;
    let (analytics_url, analytics_hits) = spawn_analytics(icp_document(), Duration::ZERO).await;
    let (dashboard, _database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);

    for feature in [Feature::Compliance, Feature::Icp] {
        let (outcome, state) = dashboard
            .analyze(feature, false, CancellationToken::new())
            .await;
        assert_eq!(outcome, TriggerOutcome::EmptyInput);
        assert_eq!(state, AnalysisState::Idle);
    }
    assert_eq!(chat_hits.load(Ordering::SeqCst), 0);
    assert_eq!(analytics_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_report_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("marketlens.db");
    let (chat_url, _) = spawn_chat_upstream(200, completion("Strengths: loyal buyers")).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::ZERO).await;

    {
        let (dashboard, _database) = dashboard_at(&db_path, &chat_url, &analytics_url, TIMEOUT);
        for input in ["organic tea brand", "cold brew coffee"] {
            dashboard.set_input(input).unwrap();
            let (outcome, _) = dashboard
                .analyze(Feature::Swot, false, CancellationToken::new())
                .await;
            assert_eq!(outcome, TriggerOutcome::Fetched);
        }
    }

    let (dashboard, database) = dashboard_at(&db_path, &chat_url, &analytics_url, TIMEOUT);
    let reports = dashboard.history().list(Feature::Swot).unwrap();
    let inputs: Vec<&str> = reports.iter().map(|r| r.input.as_str()).collect();
    assert_eq!(inputs, vec!["cold brew coffee", "organic tea brand"]);
    assert!(database.get_entry("swotReports").unwrap().is_some());
    assert!(dashboard.history().list(Feature::Compliance).unwrap().is_empty());
}

// ============================================================================
// Backend-driven features
// ============================================================================

#[tokio::test]
async fn test_backend_result_is_cached_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, _) = spawn_chat_upstream(200, completion("unused")).await;
    let (analytics_url, analytics_hits) = spawn_analytics(icp_document(), Duration::ZERO).await;
    let (dashboard, database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);
    dashboard.set_input("organic tea brand").unwrap();

    let (outcome, state) = dashboard
        .analyze(Feature::Icp, false, CancellationToken::new())
        .await;
    assert_eq!(outcome, TriggerOutcome::Fetched);
    let document = state.result().and_then(|r| r.as_json()).unwrap();
    assert_eq!(document["demographics"]["age"], "25-40");

    let stored = database.get_entry("icpAnalysis_organic tea brand").unwrap();
    assert!(stored.unwrap().contains("pain_points"));

    let (again, _) = dashboard
        .analyze(Feature::Icp, false, CancellationToken::new())
        .await;
    assert_eq!(again, TriggerOutcome::CacheHit);
    assert_eq!(analytics_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_backend_missing_fields_is_validation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, _) = spawn_chat_upstream(200, completion("unused")).await;
    let (analytics_url, _) = spawn_analytics(
        json!({ "main_competitors": ["Brand A"], "sources": [] }),
        Duration::ZERO,
    )
    .await;
    let (dashboard, _database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);
    dashboard.set_input("organic tea brand").unwrap();

    let (outcome, state) = dashboard
        .analyze(Feature::Competitor, false, CancellationToken::new())
        .await;

    assert_eq!(outcome, TriggerOutcome::Failed);
    match state {
        AnalysisState::Failure { error, message, .. } => {
            assert!(matches!(error, AnalysisError::Validation(_)));
            assert!(message.contains("competitor_strengths"));
            assert!(message.contains("key_findings"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(dashboard.cache().count(Feature::Competitor).unwrap(), 0);
}

#[tokio::test]
async fn test_backend_timeout_leaves_cache_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, _) = spawn_chat_upstream(200, completion("unused")).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::from_secs(3)).await;
    let (dashboard, _database) = dashboard_at(
        &dir.path().join("db.sqlite"),
        &chat_url,
        &analytics_url,
        Duration::from_secs(1),
    );
    dashboard.set_input("organic tea brand").unwrap();

    let (outcome, state) = dashboard
        .analyze(Feature::Icp, false, CancellationToken::new())
        .await;

    assert_eq!(outcome, TriggerOutcome::Failed);
    match state {
        AnalysisState::Failure { error, message, .. } => {
            assert!(matches!(error, AnalysisError::Timeout(_)));
            assert!(message.contains("timed out"), "got: {}", message);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(dashboard.cache().count(Feature::Icp).unwrap(), 0);
}

#[tokio::test]
async fn test_cancel_returns_to_idle() {
    let dir = tempfile::tempdir().unwrap();
    let (chat_url, _) = spawn_chat_upstream(200, completion("unused")).await;
    let (analytics_url, _) = spawn_analytics(icp_document(), Duration::from_secs(3)).await;
    let (dashboard, _database) =
        dashboard_at(&dir.path().join("db.sqlite"), &chat_url, &analytics_url, TIMEOUT);
    dashboard.set_input("organic tea brand").unwrap();

    let cancel = CancellationToken::new();
    let trigger = {
        let dashboard = dashboard.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { dashboard.analyze(Feature::Icp, false, cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(dashboard.state(Feature::Icp).await.is_loading());
    cancel.cancel();

    let (outcome, state) = trigger.await.unwrap();
    assert_eq!(outcome, TriggerOutcome::Cancelled);
    assert_eq!(state, AnalysisState::Idle);
    assert_eq!(dashboard.cache().count(Feature::Icp).unwrap(), 0);
}
