//! Analysis Models
//!
//! Results, orchestrator states and the user-facing error taxonomy shared by
//! the analysis services and the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use marketlens_core::{Feature, FeatureSource};
use marketlens_llm::LlmError;

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// Report text from a prompt-driven feature
    Text(String),
    /// Structured document from an analytics backend endpoint
    Json(serde_json::Value),
}

impl AnalysisResult {
    /// Encode for the key-value store: text as-is, JSON as compact JSON.
    pub fn to_stored(&self) -> String {
        match self {
            AnalysisResult::Text(text) => text.clone(),
            AnalysisResult::Json(value) => value.to_string(),
        }
    }

    /// Decode a stored entry according to how `feature` produces results.
    pub fn from_stored(feature: Feature, raw: &str) -> Result<Self, serde_json::Error> {
        match feature.source() {
            FeatureSource::Prompt => Ok(AnalysisResult::Text(raw.to_string())),
            FeatureSource::Backend { .. } => serde_json::from_str(raw).map(AnalysisResult::Json),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnalysisResult::Text(text) => Some(text),
            AnalysisResult::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            AnalysisResult::Json(value) => Some(value),
            AnalysisResult::Text(_) => None,
        }
    }
}

/// Why an analysis run did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AnalysisError {
    /// Missing credential or unusable configuration; raised before any call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote service could not be reached
    #[error("Server unavailable: {0}")]
    Network(String),

    /// The call exceeded the client-side timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-success status, or a malformed or empty reply
    #[error("{0}")]
    Provider(String),

    /// A 200 reply that is empty or missing expected fields
    #[error("Invalid response: {0}")]
    Validation(String),

    /// Superseded by the caller; never shown as a failure
    #[error("Request cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Message suitable for showing next to the feature.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ConfigurationMissing { message } => AnalysisError::Configuration(message),
            LlmError::NetworkError { message } => AnalysisError::Network(message),
            LlmError::Timeout { message } => AnalysisError::Timeout(message),
            LlmError::Cancelled => AnalysisError::Cancelled,
            other => AnalysisError::Provider(other.to_string()),
        }
    }
}

/// Lifecycle of one feature's orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisState {
    #[default]
    Idle,
    Loading {
        input: String,
        started_at: DateTime<Utc>,
    },
    Success {
        input: String,
        result: AnalysisResult,
        /// True when surfaced from the cache without a network call
        from_cache: bool,
        completed_at: DateTime<Utc>,
    },
    Failure {
        input: String,
        error: AnalysisError,
        message: String,
        failed_at: DateTime<Utc>,
    },
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisState::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisState::Failure { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// What a trigger call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// Input was empty; nothing happened
    EmptyInput,
    /// A request for this feature was already in flight
    AlreadyLoading,
    /// Served from the analysis cache
    CacheHit,
    /// Fetched and cached a fresh result
    Fetched,
    /// The fetch failed; the cache was not touched
    Failed,
    /// Cancelled while loading; the cache was not touched
    Cancelled,
}

/// Catalogue entry returned by `GET /api/features`
#[derive(Debug, Clone, Serialize)]
pub struct FeatureInfo {
    pub slug: &'static str,
    pub title: &'static str,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<&'static str>,
    pub expected_fields: &'static [&'static str],
}

impl From<Feature> for FeatureInfo {
    fn from(feature: Feature) -> Self {
        let (source, endpoint) = match feature.source() {
            FeatureSource::Prompt => ("prompt", None),
            FeatureSource::Backend { endpoint } => ("backend", Some(endpoint)),
        };
        Self {
            slug: feature.slug(),
            title: feature.title(),
            source,
            endpoint,
            expected_fields: feature.expected_fields(),
        }
    }
}

/// One entry of a feature's saved-report history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub id: Uuid,
    pub input: String,
    pub result: AnalysisResult,
    pub saved_at: DateTime<Utc>,
}
