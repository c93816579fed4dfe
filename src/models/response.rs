//! Response Types
//!
//! Standard envelope and request bodies for the HTTP API.

use serde::{Deserialize, Serialize};

/// Generic response envelope for all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, crate::utils::error::AppError>> for CommandResponse<T> {
    fn from(result: Result<T, crate::utils::error::AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub database: bool,
    pub config: bool,
    /// Backend answering prompt-driven features
    pub provider: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "marketlens".to_string(),
            database: false,
            config: false,
            provider: String::new(),
        }
    }
}

/// Body of `PUT /api/input`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputUpdate {
    pub value: String,
}

/// Body of `POST /api/analysis/:feature`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Bypass the cache and fetch again
    #[serde(default)]
    pub refresh: bool,
}
