//! Proxy Chat Provider
//!
//! Sends prompts to the application's own `POST /api/chat` route. The route
//! holds the provider credential and mirrors the provider's completion
//! envelope back, so this client never sees an API key.

use async_trait::async_trait;

use super::provider::{map_request_error, parse_http_error, LlmProvider};
use super::types::{validate_messages, ChatCompletion, LlmError, LlmResult, Message, ProviderConfig};
use crate::http_client::build_http_client;

/// Default chat proxy route when running against a local server
const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787/api/chat";

/// Client for the server-side chat proxy
pub struct ProxyChatProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl ProxyChatProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client(config.timeout());
        Self { config, client }
    }

    fn endpoint(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(DEFAULT_PROXY_URL)
    }
}

#[async_trait]
impl LlmProvider for ProxyChatProvider {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_messages(&self, messages: &[Message]) -> LlmResult<String> {
        validate_messages(messages)?;

        tracing::debug!(endpoint = self.endpoint(), "Sending prompt through chat proxy");

        let response = self
            .client
            .post(self.endpoint())
            .json(&serde_json::json!({ "messages": messages }))
            .send()
            .await
            .map_err(|e| map_request_error(e, "chat proxy", self.config.timeout()))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| map_request_error(e, "chat proxy", self.config.timeout()))?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        let completion: ChatCompletion =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse proxy response: {}", e),
            })?;

        completion.into_text(self.name())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}
