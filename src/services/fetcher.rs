//! Analysis Fetchers
//!
//! The network half of an orchestration: turn `(feature, input)` into an
//! [`AnalysisResult`] by asking either the LLM provider or the analytics
//! backend. Orchestrators hold an `Arc<dyn AnalysisFetcher>` so tests can
//! substitute a scripted one.

use std::sync::Arc;

use async_trait::async_trait;

use marketlens_core::{Feature, FeatureSource};
use marketlens_llm::{LlmError, LlmProvider};

use crate::models::analysis::{AnalysisError, AnalysisResult};
use crate::services::analytics_client::AnalyticsClient;
use crate::services::prompts::build_messages;

#[async_trait]
pub trait AnalysisFetcher: Send + Sync {
    /// Produce a fresh result. Exactly one outbound call per invocation.
    async fn fetch(&self, feature: Feature, input: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Routes each feature to the provider or the analytics backend.
pub struct FeatureFetcher {
    /// Provider construction error is kept so prompt features fail fast
    /// with it instead of attempting a call.
    provider: Result<Arc<dyn LlmProvider>, LlmError>,
    analytics: Arc<AnalyticsClient>,
}

impl FeatureFetcher {
    pub fn new(
        provider: Result<Arc<dyn LlmProvider>, LlmError>,
        analytics: Arc<AnalyticsClient>,
    ) -> Self {
        Self {
            provider,
            analytics,
        }
    }

    async fn fetch_prompt(
        &self,
        feature: Feature,
        input: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let provider = self.provider.as_ref().map_err(|e| AnalysisError::from(e.clone()))?;
        let messages = build_messages(feature, input).ok_or_else(|| {
            AnalysisError::Configuration(format!("no prompt defined for {}", feature))
        })?;

        let text = provider.send_messages(&messages).await?;
        Ok(AnalysisResult::Text(text))
    }
}

#[async_trait]
impl AnalysisFetcher for FeatureFetcher {
    async fn fetch(&self, feature: Feature, input: &str) -> Result<AnalysisResult, AnalysisError> {
        match feature.source() {
            FeatureSource::Prompt => self.fetch_prompt(feature, input).await,
            FeatureSource::Backend { .. } => self
                .analytics
                .analyze(feature, input)
                .await
                .map(AnalysisResult::Json),
        }
    }
}
