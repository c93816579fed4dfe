//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file, and
//! layers environment overrides on top of what is on disk. Overrides are
//! never written back.

use std::fs;
use std::path::{Path, PathBuf};

use marketlens_llm::ProviderType;

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir, ensure_marketlens_dir};

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Create a new config service, loading existing config or creating defaults
    pub fn new() -> AppResult<Self> {
        ensure_marketlens_dir()?;
        Self::open(config_path()?)
    }

    /// Open the config at an explicit path, creating defaults if missing
    pub fn open(config_path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = config_path.into();
        if let Some(parent) = config_path.parent() {
            ensure_dir(parent)?;
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration as stored on disk
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Configuration with environment overrides applied
    pub fn effective_config(&self) -> AppResult<AppConfig> {
        let mut config = self.config.clone();
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Update the configuration with a partial update.
    ///
    /// An update that fails validation leaves both memory and disk untouched.
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut candidate = self.config.clone();
        candidate.apply_update(update);
        Self::save_to_file(&self.config_path, &candidate)?;
        self.config = candidate;
        Ok(self.config.clone())
    }

    /// Check if the config service is healthy
    pub fn is_healthy(&self) -> bool {
        self.config_path.exists() && self.config.validate().is_ok()
    }
}

/// Apply `MARKETLENS_*`, `GROQ_*` and `ANALYTICS_BASE_URL` overrides.
///
/// `lookup` is `std::env::var` in production; blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(provider) = get("MARKETLENS_PROVIDER") {
        config.provider = provider
            .parse::<ProviderType>()
            .map_err(|e| AppError::config(e.to_string()))?;
    }
    if let Some(addr) = get("MARKETLENS_ADDR") {
        config.bind_addr = addr;
    }
    if let Some(url) = get("MARKETLENS_CHAT_URL") {
        config.chat_proxy_url = url;
    }
    if let Some(url) = get("ANALYTICS_BASE_URL") {
        config.analytics_base_url = url;
    }
    if let Some(url) = get("GROQ_API_URL") {
        config.upstream_chat_url = url.clone();
        if config.provider == ProviderType::Groq {
            config.provider_base_url = Some(url);
        }
    }
    if let Some(model) = get("GROQ_MODEL") {
        config.upstream_model = model.clone();
        if config.provider == ProviderType::Groq {
            config.model = Some(model);
        }
    }
    Ok(())
}
