//! OpenAI-Compatible Provider
//!
//! Direct client for OpenAI-style `/chat/completions` endpoints. Serves both
//! Groq (the default direct backend) and OpenAI itself; they differ only in
//! endpoint and default model.

use async_trait::async_trait;

use super::provider::{map_request_error, missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{
    validate_messages, ChatCompletion, LlmError, LlmResult, Message, ProviderConfig, ProviderType,
};
use crate::http_client::build_http_client;

/// Default Groq API endpoint
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client(config.timeout());
        Self { config, client }
    }

    /// Get the API endpoint
    fn endpoint(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(match self.config.provider {
            ProviderType::OpenAI => OPENAI_API_URL,
            _ => GROQ_API_URL,
        })
    }

    /// Build the request body for the API
    fn build_request_body(&self, messages: &[Message]) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "top_p": 1,
            "stream": false,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        match self.config.provider {
            ProviderType::OpenAI => "openai",
            _ => "groq",
        }
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
            .ok_or_else(|| missing_api_key_error(self.name()))?;

        let body = self.build_request_body(messages);
        tracing::debug!(
            provider = self.name(),
            model = %self.config.model,
            messages = messages.len(),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.name(), self.config.timeout()))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| map_request_error(e, self.name(), self.config.timeout()))?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        let completion: ChatCompletion =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        completion.into_text(self.name())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}
