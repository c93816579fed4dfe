//! Chat Proxy
//!
//! Server side of `POST /api/chat`: forwards `{messages}` to the hosted
//! chat-completions API with the server-held key and hands the provider's
//! envelope back. The key never leaves this process.

use std::time::Duration;

use serde_json::{json, Value};

use marketlens_llm::{build_http_client, extract_error_message, Message};

/// Status code and JSON body to return to the caller verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: u16,
    pub body: Value,
}

impl ProxyReply {
    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

pub struct ChatProxy {
    client: reqwest::Client,
    upstream_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatProxy {
    pub fn new(
        upstream_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: build_http_client(timeout),
            upstream_url: upstream_url.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forward `messages` upstream.
    ///
    /// A missing key answers 500 before any upstream call. Upstream failures
    /// keep the upstream status with the provider's own message.
    pub async fn forward(&self, messages: &[Message]) -> ProxyReply {
        let Some(api_key) = &self.api_key else {
            return ProxyReply::error(500, "API key not configured");
        };

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 4096,
        });

        let response = match self
            .client
            .post(&self.upstream_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Chat proxy upstream request failed: {}", e);
                let status = if e.is_timeout() { 504 } else { 502 };
                return ProxyReply::error(status, "Internal server error");
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Chat proxy failed to read upstream body: {}", e);
                return ProxyReply::error(502, "Internal server error");
            }
        };

        if !(200..300).contains(&status) {
            let message =
                extract_error_message(&text).unwrap_or_else(|| "API request failed".to_string());
            tracing::warn!(status, "Chat proxy upstream error: {}", message);
            return ProxyReply::error(status, message);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(envelope) => ProxyReply {
                status,
                body: envelope,
            },
            Err(e) => {
                tracing::error!("Chat proxy received non-JSON body: {}", e);
                ProxyReply::error(502, "Internal server error")
            }
        }
    }
}
