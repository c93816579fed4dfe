//! Gemini Provider
//!
//! Google Gemini `generateContent` client. System messages become the
//! `systemInstruction`; user and assistant messages become `contents`.

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::{map_request_error, missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{validate_messages, LlmError, LlmResult, Message, MessageRole, ProviderConfig};
use crate::http_client::build_http_client;

/// Gemini API base; the model and method are appended per request
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client(config.timeout());
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_BASE)
            .trim_end_matches('/');
        format!("{}/{}:generateContent", base, self.config.model)
    }

    fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        let system_text = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                let role = if m.role == MessageRole::Assistant {
                    "model"
                } else {
                    "user"
                };
                serde_json::json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system_text }] },
            "contents": contents,
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens,
            }
        })
    }
}

/// Extract the first candidate's text.
fn candidate_text(response: GeminiResponse) -> LlmResult<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::EmptyResponse {
            message: "No response from gemini".to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(LlmError::EmptyResponse {
            message: "Empty response from gemini".to_string(),
        })
    } else {
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_messages(&self, messages: &[Message]) -> LlmResult<String> {
        validate_messages(messages)?;

        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| missing_api_key_error("gemini"))?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.as_str())
            .json(&self.build_request_body(messages))
            .send()
            .await
            .map_err(|e| map_request_error(e, "gemini", self.config.timeout()))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| map_request_error(e, "gemini", self.config.timeout()))?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, "gemini"));
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        candidate_text(parsed)
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}
