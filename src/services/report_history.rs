//! Report History
//!
//! The newest fetched reports per feature, kept as one JSON array under
//! [`Feature::reports_key`]. Cache hits are not recorded; every fresh fetch
//! is, newest first, capped at [`MAX_SAVED_REPORTS`].

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use marketlens_core::{Feature, KeyValueStore};

use crate::models::analysis::{AnalysisResult, SavedReport};
use crate::utils::error::AppResult;

/// Reports kept per feature
pub const MAX_SAVED_REPORTS: usize = 10;

#[derive(Clone)]
pub struct ReportHistory {
    store: Arc<dyn KeyValueStore>,
}

impl ReportHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved reports for `feature`, newest first.
    ///
    /// A history that no longer decodes is reported as empty; the next
    /// recorded report replaces it.
    pub fn list(&self, feature: Feature) -> AppResult<Vec<SavedReport>> {
        let Some(raw) = self.store.get(&feature.reports_key())? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(reports) => Ok(reports),
            Err(e) => {
                tracing::warn!(feature = %feature, "Ignoring undecodable report history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Prepend a report for `(feature, input)` and drop the oldest beyond the cap.
    ///
    /// Callers hold the feature's orchestrator slot, so there is one writer
    /// per key at a time.
    pub fn record(
        &self,
        feature: Feature,
        input: &str,
        result: &AnalysisResult,
    ) -> AppResult<SavedReport> {
        let report = SavedReport {
            id: Uuid::new_v4(),
            input: input.to_string(),
            result: result.clone(),
            saved_at: Utc::now(),
        };

        let mut reports = self.list(feature)?;
        reports.insert(0, report.clone());
        reports.truncate(MAX_SAVED_REPORTS);

        self.store
            .set(&feature.reports_key(), &serde_json::to_string(&reports)?)?;
        Ok(report)
    }

    /// Delete every saved report for `feature`. Returns how many were removed.
    pub fn clear(&self, feature: Feature) -> AppResult<usize> {
        let removed = self.list(feature)?.len();
        self.store.remove(&feature.reports_key())?;
        tracing::info!(feature = %feature, removed, "Report history cleared");
        Ok(removed)
    }
}
