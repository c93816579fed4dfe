//! Settings Models
//!
//! Application configuration and settings data structures. Credentials are
//! deliberately absent: they come from the environment only (see
//! [`ProviderSecrets`]) and are never written to `config.json`.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use marketlens_llm::{ProviderConfig, ProviderType};

/// How cache keys are derived from the raw input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyPolicy {
    /// Use the input exactly as typed; whitespace or case edits miss the cache.
    #[default]
    Raw,
    /// Trim and lowercase the input before composing the key.
    Normalized,
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which provider backend answers prompt-driven features
    pub provider: ProviderType,
    /// Model override; `None` uses the backend's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Endpoint override for direct backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_base_url: Option<String>,
    /// Where the proxy backend sends prompts
    pub chat_proxy_url: String,
    /// Hosted chat-completions endpoint the `/api/chat` route forwards to
    pub upstream_chat_url: String,
    /// Model the `/api/chat` route requests upstream
    pub upstream_model: String,
    /// Base URL of the analytics backend service
    pub analytics_base_url: String,
    /// Client-side bound on every outbound call, in seconds
    pub request_timeout_secs: u64,
    /// Bounded retries for transient provider failures (0 = none)
    #[serde(default)]
    pub max_retries: u32,
    /// Cache key derivation
    #[serde(default)]
    pub cache_key_policy: CacheKeyPolicy,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Run missing analyses automatically when the stored input changes
    #[serde(default)]
    pub auto_analyze: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Proxy,
            model: None,
            provider_base_url: None,
            chat_proxy_url: "http://127.0.0.1:8787/api/chat".to_string(),
            upstream_chat_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            upstream_model: "mixtral-8x7b-32768".to_string(),
            analytics_base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
            max_retries: 0,
            cache_key_policy: CacheKeyPolicy::Raw,
            bind_addr: "127.0.0.1:8787".to_string(),
            auto_analyze: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub provider: Option<ProviderType>,
    pub model: Option<String>,
    pub provider_base_url: Option<String>,
    pub chat_proxy_url: Option<String>,
    pub upstream_chat_url: Option<String>,
    pub upstream_model: Option<String>,
    pub analytics_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub cache_key_policy: Option<CacheKeyPolicy>,
    pub bind_addr: Option<String>,
    pub auto_analyze: Option<bool>,
}

/// Provider credentials, sourced from the environment only.
#[derive(Clone, Default)]
pub struct ProviderSecrets {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl ProviderSecrets {
    /// Read `GROQ_API_KEY`, `OPENAI_API_KEY` and `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            groq_api_key: read("GROQ_API_KEY"),
            openai_api_key: read("OPENAI_API_KEY"),
            gemini_api_key: read("GEMINI_API_KEY"),
        }
    }

    /// Key for a given backend, if one is configured.
    pub fn key_for(&self, provider: ProviderType) -> Option<String> {
        match provider {
            ProviderType::Proxy => None,
            ProviderType::Groq => self.groq_api_key.clone(),
            ProviderType::OpenAI => self.openai_api_key.clone(),
            ProviderType::Gemini => self.gemini_api_key.clone(),
        }
    }
}

impl std::fmt::Debug for ProviderSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSecrets")
            .field("groq_api_key", &self.groq_api_key.is_some())
            .field("openai_api_key", &self.openai_api_key.is_some())
            .field("gemini_api_key", &self.gemini_api_key.is_some())
            .finish()
    }
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(provider) = update.provider {
            self.provider = provider;
        }
        if let Some(model) = update.model {
            self.model = Some(model).filter(|m| !m.trim().is_empty());
        }
        if let Some(url) = update.provider_base_url {
            self.provider_base_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(url) = update.chat_proxy_url {
            self.chat_proxy_url = url;
        }
        if let Some(url) = update.upstream_chat_url {
            self.upstream_chat_url = url;
        }
        if let Some(model) = update.upstream_model {
            self.upstream_model = model;
        }
        if let Some(url) = update.analytics_base_url {
            self.analytics_base_url = url;
        }
        if let Some(secs) = update.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(retries) = update.max_retries {
            self.max_retries = retries;
        }
        if let Some(policy) = update.cache_key_policy {
            self.cache_key_policy = policy;
        }
        if let Some(addr) = update.bind_addr {
            self.bind_addr = addr;
        }
        if let Some(auto) = update.auto_analyze {
            self.auto_analyze = auto;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(format!(
                "request_timeout_secs must be between 1 and 300, got {}",
                self.request_timeout_secs
            ));
        }

        if self.max_retries > 5 {
            return Err("max_retries cannot exceed 5".to_string());
        }

        for (field, value) in [
            ("chat_proxy_url", Some(self.chat_proxy_url.as_str())),
            ("upstream_chat_url", Some(self.upstream_chat_url.as_str())),
            ("analytics_base_url", Some(self.analytics_base_url.as_str())),
            ("provider_base_url", self.provider_base_url.as_deref()),
        ] {
            if let Some(value) = value {
                validate_http_url(field, value)?;
            }
        }

        if self.upstream_model.trim().is_empty() {
            return Err("upstream_model must not be empty".to_string());
        }

        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid bind_addr {}: {}", self.bind_addr, e))?;

        Ok(())
    }

    /// Provider configuration for prompt-driven features.
    pub fn provider_config(&self, secrets: &ProviderSecrets) -> ProviderConfig {
        let mut config = ProviderConfig::for_provider(self.provider);
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config.base_url = match self.provider {
            ProviderType::Proxy => Some(self.chat_proxy_url.clone()),
            _ => self.provider_base_url.clone(),
        };
        config.api_key = secrets.key_for(self.provider);
        config.timeout_secs = self.request_timeout_secs;
        config.max_retries = self.max_retries;
        config
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("Invalid {}: {}", field, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "Invalid {}: unsupported scheme '{}'",
            field, other
        )),
    }
}
