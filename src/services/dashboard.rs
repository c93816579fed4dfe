//! Dashboard
//!
//! Owns the stored input and one orchestrator per feature, and keeps them in
//! step: when the stored input changes every feature re-checks the cache for
//! the new value.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use marketlens_core::Feature;

use crate::models::analysis::{AnalysisState, TriggerOutcome};
use crate::services::analysis_cache::AnalysisCache;
use crate::services::fetcher::AnalysisFetcher;
use crate::services::orchestrator::AnalysisOrchestrator;
use crate::services::report_history::ReportHistory;
use crate::services::stored_input::StoredInput;
use crate::utils::error::AppResult;

pub struct Dashboard {
    input: Arc<StoredInput>,
    cache: AnalysisCache,
    history: ReportHistory,
    orchestrators: BTreeMap<Feature, Arc<AnalysisOrchestrator>>,
    auto_analyze: bool,
    shutdown: CancellationToken,
}

impl Dashboard {
    pub fn new(
        input: Arc<StoredInput>,
        cache: AnalysisCache,
        history: ReportHistory,
        fetcher: Arc<dyn AnalysisFetcher>,
        timeout: Duration,
        auto_analyze: bool,
    ) -> Self {
        let orchestrators = Feature::ALL
            .into_iter()
            .map(|feature| {
                let orch = AnalysisOrchestrator::new(
                    feature,
                    fetcher.clone(),
                    cache.clone(),
                    history.clone(),
                    timeout,
                );
                (feature, Arc::new(orch))
            })
            .collect();

        Self {
            input,
            cache,
            history,
            orchestrators,
            auto_analyze,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn stored_input(&self) -> &Arc<StoredInput> {
        &self.input
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Saved reports of fresh fetches, per feature
    pub fn history(&self) -> &ReportHistory {
        &self.history
    }

    pub fn orchestrator(&self, feature: Feature) -> Option<&Arc<AnalysisOrchestrator>> {
        self.orchestrators.get(&feature)
    }

    /// Current state of `feature`.
    pub async fn state(&self, feature: Feature) -> AnalysisState {
        match self.orchestrator(feature) {
            Some(orch) => orch.state().await,
            None => AnalysisState::Idle,
        }
    }

    /// States of every feature, in catalogue order.
    pub async fn states(&self) -> Vec<(Feature, AnalysisState)> {
        let mut states = Vec::with_capacity(self.orchestrators.len());
        for (feature, orch) in &self.orchestrators {
            states.push((*feature, orch.state().await));
        }
        states
    }

    /// Analyse the current stored input for `feature`.
    ///
    /// `cancel` is linked to the dashboard's shutdown token.
    pub async fn analyze(
        &self,
        feature: Feature,
        force_refresh: bool,
        cancel: CancellationToken,
    ) -> (TriggerOutcome, AnalysisState) {
        let Some(orch) = self.orchestrator(feature) else {
            return (TriggerOutcome::EmptyInput, AnalysisState::Idle);
        };

        let input = self.input.read();
        let linked = self.shutdown.child_token();
        let trigger = orch.trigger(&input, force_refresh, linked.clone());
        tokio::pin!(trigger);

        let outcome = tokio::select! {
            outcome = &mut trigger => outcome,
            _ = cancel.cancelled() => {
                linked.cancel();
                trigger.await
            }
        };
        (outcome, orch.state().await)
    }

    /// Save a new stored input. Subscribers (the input watcher) pick it up.
    pub fn set_input(&self, value: &str) -> AppResult<()> {
        self.input.write(value)
    }

    /// Bring every feature in line with `input`.
    ///
    /// Cache hits become `Success` without a network call. With
    /// `auto_analyze` on, misses are fetched in the background.
    pub async fn refresh_for_input(&self, input: &str) {
        let mut hits = 0usize;
        for (feature, orch) in &self.orchestrators {
            if orch.on_input_changed(input).await {
                hits += 1;
            } else if self.auto_analyze && !input.trim().is_empty() {
                let orch = orch.clone();
                let input = input.to_string();
                let token = self.shutdown.child_token();
                tracing::debug!(feature = %feature, "Auto-analyzing new input");
                tokio::spawn(async move {
                    orch.trigger(&input, false, token).await;
                });
            }
        }
        tracing::info!(cached = hits, "Stored input changed");
    }

    /// Follow the stored input and refresh features on every change.
    ///
    /// Stops when [`Dashboard::shutdown`] is called.
    pub fn spawn_input_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let dashboard = Arc::clone(self);
        let mut rx = self.input.subscribe();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let value = rx.borrow_and_update().clone();
                        dashboard.refresh_for_input(&value).await;
                    }
                }
            }
            tracing::debug!("Input watcher stopped");
        })
    }

    /// Cancel in-flight analyses and stop the input watcher.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
