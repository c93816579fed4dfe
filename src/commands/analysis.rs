//! Analysis Commands
//!
//! Inspect and trigger per-feature analyses for the stored input.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use marketlens_core::Feature;

use crate::commands::{respond, ApiResponse};
use crate::models::analysis::{AnalysisState, SavedReport, TriggerOutcome};
use crate::models::response::AnalyzeRequest;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// One feature's state, as returned by the analysis endpoints
#[derive(Debug, Clone, Serialize)]
pub struct FeatureAnalysis {
    pub feature: Feature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TriggerOutcome>,
    pub state: AnalysisState,
}

/// States of every feature
pub async fn list_analyses(State(state): State<Arc<AppState>>) -> ApiResponse<Vec<FeatureAnalysis>> {
    respond(all_states(&state).await)
}

/// Current state of one feature
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(feature): Path<String>,
) -> ApiResponse<FeatureAnalysis> {
    respond(feature_state(&state, &feature).await)
}

/// Trigger an analysis of the stored input for one feature.
///
/// Accepts an empty body; `{"refresh": true}` bypasses the cache.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Path(feature): Path<String>,
    body: Option<Json<AnalyzeRequest>>,
) -> ApiResponse<FeatureAnalysis> {
    let request = body.map(|Json(req)| req).unwrap_or_default();
    respond(trigger(&state, &feature, request.refresh).await)
}

/// Saved reports for one feature, newest first
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Path(feature): Path<String>,
) -> ApiResponse<Vec<SavedReport>> {
    respond(feature_reports(&state, &feature).await)
}

/// Delete one feature's saved reports; answers with how many were removed
pub async fn clear_reports(
    State(state): State<Arc<AppState>>,
    Path(feature): Path<String>,
) -> ApiResponse<usize> {
    respond(remove_reports(&state, &feature).await)
}

async fn all_states(state: &AppState) -> AppResult<Vec<FeatureAnalysis>> {
    let dashboard = state.dashboard().await?;
    Ok(dashboard
        .states()
        .await
        .into_iter()
        .map(|(feature, state)| FeatureAnalysis {
            feature,
            outcome: None,
            state,
        })
        .collect())
}

async fn feature_state(state: &AppState, slug: &str) -> AppResult<FeatureAnalysis> {
    let feature: Feature = slug.parse()?;
    let dashboard = state.dashboard().await?;
    Ok(FeatureAnalysis {
        feature,
        outcome: None,
        state: dashboard.state(feature).await,
    })
}

async fn trigger(state: &AppState, slug: &str, refresh: bool) -> AppResult<FeatureAnalysis> {
    let feature: Feature = slug.parse()?;
    let dashboard = state.dashboard().await?;

    // Run on its own task so a client disconnect does not abort the fetch.
    let task = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            dashboard
                .analyze(feature, refresh, CancellationToken::new())
                .await
        })
    };
    let (outcome, state) = task
        .await
        .map_err(|e| AppError::internal(format!("Analysis task failed: {}", e)))?;

    Ok(FeatureAnalysis {
        feature,
        outcome: Some(outcome),
        state,
    })
}

async fn feature_reports(state: &AppState, slug: &str) -> AppResult<Vec<SavedReport>> {
    let feature: Feature = slug.parse()?;
    state.dashboard().await?.history().list(feature)
}

async fn remove_reports(state: &AppState, slug: &str) -> AppResult<usize> {
    let feature: Feature = slug.parse()?;
    state.dashboard().await?.history().clear(feature)
}
