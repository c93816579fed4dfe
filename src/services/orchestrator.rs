//! Analysis Orchestrator
//!
//! One orchestrator per feature. It owns the feature's [`AnalysisState`] and
//! decides, for a given input, whether to serve the cache or go to the
//! network:
//!
//! - `Idle → Loading` only for non-empty input, when not already loading, and
//!   on a cache miss or a forced refresh.
//! - `Loading → Success` writes the cache and the report history first, then
//!   exposes the result.
//! - `Loading → Failure` exposes a message and leaves the cache alone.
//! - A cancelled run returns to `Idle` without touching the cache.
//! - If the stored input changed while loading, the finished run is still
//!   cached under its own input, but the state settles on the newest input
//!   (its cached result, or `Idle`).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use marketlens_core::Feature;

use crate::models::analysis::{AnalysisError, AnalysisResult, AnalysisState, TriggerOutcome};
use crate::services::analysis_cache::AnalysisCache;
use crate::services::fetcher::AnalysisFetcher;
use crate::services::report_history::ReportHistory;

/// State plus the newest input seen while a run was in flight
#[derive(Debug, Default)]
struct Slot {
    state: AnalysisState,
    superseded_by: Option<String>,
}

pub struct AnalysisOrchestrator {
    feature: Feature,
    fetcher: Arc<dyn AnalysisFetcher>,
    cache: AnalysisCache,
    history: ReportHistory,
    timeout: Duration,
    slot: Arc<RwLock<Slot>>,
}

impl AnalysisOrchestrator {
    pub fn new(
        feature: Feature,
        fetcher: Arc<dyn AnalysisFetcher>,
        cache: AnalysisCache,
        history: ReportHistory,
        timeout: Duration,
    ) -> Self {
        Self {
            feature,
            fetcher,
            cache,
            history,
            timeout,
            slot: Arc::new(RwLock::new(Slot::default())),
        }
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> AnalysisState {
        self.slot.read().await.state.clone()
    }

    /// Run the analysis for `input`.
    ///
    /// The slot lock is only held while deciding and while publishing the
    /// outcome, never across the network call.
    pub async fn trigger(
        &self,
        input: &str,
        force_refresh: bool,
        cancel: CancellationToken,
    ) -> TriggerOutcome {
        if input.trim().is_empty() {
            return TriggerOutcome::EmptyInput;
        }

        let run_id = {
            let mut slot = self.slot.write().await;
            if slot.state.is_loading() {
                tracing::debug!(feature = %self.feature, "Analysis already in flight, ignoring trigger");
                return TriggerOutcome::AlreadyLoading;
            }

            if !force_refresh {
                if let Some(result) = self.cached(input) {
                    tracing::info!(feature = %self.feature, "Analysis cache hit");
                    slot.state = success(input, result, true);
                    return TriggerOutcome::CacheHit;
                }
            }

            let run_id = Uuid::new_v4();
            tracing::info!(
                feature = %self.feature,
                %run_id,
                force_refresh,
                "Analysis cache miss, fetching"
            );
            slot.state = AnalysisState::Loading {
                input: input.to_string(),
                started_at: Utc::now(),
            };
            slot.superseded_by = None;
            run_id
        };

        let mut guard = LoadingGuard {
            slot: Some(self.slot.clone()),
        };

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.fetcher.fetch(self.feature, input)) => {
                res.unwrap_or_else(|_| {
                    Err(AnalysisError::Timeout(format!(
                        "{} analysis did not complete within {}s",
                        self.feature,
                        self.timeout.as_secs()
                    )))
                })
            }
        };

        let mut slot = self.slot.write().await;
        guard.disarm();
        let superseded_by = slot.superseded_by.take();

        let (state, outcome) = match fetched {
            Ok(result) => {
                if let Err(e) = self.cache.put(self.feature, input, &result) {
                    tracing::error!(feature = %self.feature, %run_id, "Failed to cache analysis: {}", e);
                }
                if let Err(e) = self.history.record(self.feature, input, &result) {
                    tracing::error!(feature = %self.feature, %run_id, "Failed to save report: {}", e);
                }
                tracing::info!(feature = %self.feature, %run_id, "Analysis completed");
                (success(input, result, false), TriggerOutcome::Fetched)
            }
            Err(AnalysisError::Cancelled) => {
                tracing::info!(feature = %self.feature, %run_id, "Analysis cancelled");
                (AnalysisState::Idle, TriggerOutcome::Cancelled)
            }
            Err(error) => {
                let message = error.user_message();
                tracing::warn!(feature = %self.feature, %run_id, "Analysis failed: {}", message);
                let state = AnalysisState::Failure {
                    input: input.to_string(),
                    error,
                    message,
                    failed_at: Utc::now(),
                };
                (state, TriggerOutcome::Failed)
            }
        };

        slot.state = match superseded_by {
            Some(latest) => {
                tracing::debug!(feature = %self.feature, %run_id, "Input changed while loading");
                self.settle(&latest)
            }
            None => state,
        };
        outcome
    }

    /// React to the stored input changing to `input`.
    ///
    /// A cached result is surfaced directly as `Success`; otherwise the
    /// feature goes back to `Idle`. While a run is in flight the new input is
    /// remembered and applied when the run finishes. Returns true when a
    /// cached result was surfaced.
    pub async fn on_input_changed(&self, input: &str) -> bool {
        let mut guard = self.slot.write().await;
        let slot = &mut *guard;
        if let AnalysisState::Loading { input: loading, .. } = &slot.state {
            slot.superseded_by = (loading != input).then(|| input.to_string());
            return false;
        }

        slot.state = self.settle(input);
        matches!(slot.state, AnalysisState::Success { .. })
    }

    /// State to show for `input` without going to the network.
    fn settle(&self, input: &str) -> AnalysisState {
        if input.trim().is_empty() {
            return AnalysisState::Idle;
        }
        match self.cached(input) {
            Some(result) => success(input, result, true),
            None => AnalysisState::Idle,
        }
    }

    fn cached(&self, input: &str) -> Option<AnalysisResult> {
        match self.cache.get(self.feature, input) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(feature = %self.feature, "Cache read failed: {}", e);
                None
            }
        }
    }
}

/// Resets `Loading` to `Idle` if a trigger future is dropped mid-flight,
/// so a disconnected caller cannot wedge the feature.
///
/// When the slot is momentarily locked the reset runs on a spawned task.
/// No other trigger can start while the slot is `Loading`, so the late reset
/// cannot clobber a newer run.
struct LoadingGuard {
    slot: Option<Arc<RwLock<Slot>>>,
}

impl LoadingGuard {
    fn disarm(&mut self) {
        self.slot = None;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };

        if let Ok(mut guard) = slot.try_write() {
            reset_loading(&mut guard);
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    reset_loading(&mut *slot.write().await);
                });
            }
            Err(_) => tracing::warn!("Dropped analysis left outside a runtime; state not reset"),
        }
    }
}

fn reset_loading(slot: &mut Slot) {
    if slot.state.is_loading() {
        slot.state = AnalysisState::Idle;
        slot.superseded_by = None;
    }
}

fn success(input: &str, result: AnalysisResult, from_cache: bool) -> AnalysisState {
    AnalysisState::Success {
        input: input.to_string(),
        result,
        from_cache,
        completed_at: Utc::now(),
    }
}
