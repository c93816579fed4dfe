//! Analytics Backend Client
//!
//! Calls the structured-analysis endpoints (`POST {base}/api/<endpoint>` with
//! `{"query": ...}`) and checks the reply carries the feature's fields.

use std::time::Duration;

use serde_json::Value;

use marketlens_core::{Feature, FeatureSource};
use marketlens_llm::{build_http_client, extract_error_message, provider::map_request_error};

use crate::models::analysis::AnalysisError;

const BACKEND_NAME: &str = "analytics backend";

pub struct AnalyticsClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl AnalyticsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client(timeout),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `feature`'s backend analysis for `query`.
    pub async fn analyze(&self, feature: Feature, query: &str) -> Result<Value, AnalysisError> {
        let FeatureSource::Backend { endpoint } = feature.source() else {
            return Err(AnalysisError::Configuration(format!(
                "{} is not served by the analytics backend",
                feature
            )));
        };
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!(feature = %feature, url = %url, "Calling analytics backend");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| AnalysisError::from(map_request_error(e, BACKEND_NAME, self.timeout)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::from(map_request_error(e, BACKEND_NAME, self.timeout)))?;

        if !status.is_success() {
            let message = extract_error_message(&body).unwrap_or_else(|| {
                format!("Analytics request failed with status {}", status.as_u16())
            });
            return Err(AnalysisError::Provider(message));
        }

        let document: Value = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::Provider(format!("Malformed response from {}: {}", BACKEND_NAME, e))
        })?;

        check_fields(feature, &document)?;
        Ok(document)
    }
}

/// Reject empty documents and documents missing any of the feature's fields.
pub fn check_fields(feature: Feature, document: &Value) -> Result<(), AnalysisError> {
    let is_empty = match document {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(AnalysisError::Validation(format!(
            "{} returned an empty {} analysis",
            BACKEND_NAME, feature
        )));
    }

    let Some(map) = document.as_object() else {
        return Err(AnalysisError::Validation(format!(
            "expected a JSON object for {} analysis",
            feature
        )));
    };

    let missing: Vec<&str> = feature
        .expected_fields()
        .iter()
        .copied()
        .filter(|field| map.get(*field).map_or(true, Value::is_null))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::Validation(format!(
            "{} analysis is missing: {}",
            feature,
            missing.join(", ")
        )))
    }
}
