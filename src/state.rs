//! Application State
//!
//! Shared state behind the HTTP server and the CLI: storage, configuration,
//! and the runtime (dashboard + chat proxy) built from them. The runtime is
//! rebuilt whenever settings change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use marketlens_core::KeyValueStore;
use marketlens_llm::create_provider;

use crate::models::settings::{AppConfig, ProviderSecrets, SettingsUpdate};
use crate::services::{
    AnalysisCache, AnalyticsClient, ChatProxy, Dashboard, FeatureFetcher, ReportHistory,
    StoredInput,
};
use crate::storage::{ConfigService, Database};
use crate::utils::error::{AppError, AppResult};

/// Services derived from the effective configuration
struct Runtime {
    dashboard: Arc<Dashboard>,
    chat_proxy: Arc<ChatProxy>,
    watcher: Option<JoinHandle<()>>,
}

/// Application state shared by every handler
pub struct AppState {
    /// SQLite database with connection pool
    database: Arc<RwLock<Option<Database>>>,
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Dashboard and chat proxy for the current configuration
    runtime: Arc<RwLock<Option<Runtime>>>,
    /// Credentials from the environment
    secrets: ProviderSecrets,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new(secrets: ProviderSecrets) -> Self {
        Self {
            database: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(None)),
            runtime: Arc::new(RwLock::new(None)),
            secrets,
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize all services from the default data directory
    pub async fn initialize(&self) -> AppResult<()> {
        if *self.initialized.read().await {
            return Ok(());
        }
        self.initialize_with(Database::new()?, ConfigService::new()?)
            .await
    }

    /// Initialize from explicit storage (used by tests and custom homes)
    pub async fn initialize_with(&self, database: Database, config: ConfigService) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let effective = config.effective_config()?;
        *self.database.write().await = Some(database);
        *self.config.write().await = Some(config);
        self.rebuild_runtime(&effective).await?;

        *initialized = true;
        tracing::info!(
            provider = %effective.provider,
            analytics = %effective.analytics_base_url,
            "Application state initialized"
        );
        Ok(())
    }

    /// Replace the runtime with one built from `config`.
    async fn rebuild_runtime(&self, config: &AppConfig) -> AppResult<()> {
        let database = self
            .database
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::database("Database not initialized"))?;

        let (dashboard, chat_proxy) = build_runtime(config, &self.secrets, database)?;
        dashboard
            .refresh_for_input(&dashboard.stored_input().read())
            .await;

        let mut runtime = self.runtime.write().await;
        if let Some(old) = runtime.take() {
            old.dashboard.shutdown();
            if let Some(watcher) = old.watcher {
                watcher.abort();
            }
        }
        *runtime = Some(Runtime {
            watcher: Some(dashboard.spawn_input_watcher()),
            dashboard,
            chat_proxy,
        });
        Ok(())
    }

    /// The dashboard for the current configuration
    pub async fn dashboard(&self) -> AppResult<Arc<Dashboard>> {
        let guard = self.runtime.read().await;
        match &*guard {
            Some(runtime) => Ok(runtime.dashboard.clone()),
            None => Err(AppError::internal("Application state not initialized")),
        }
    }

    /// The chat proxy for the current configuration
    pub async fn chat_proxy(&self) -> AppResult<Arc<ChatProxy>> {
        let guard = self.runtime.read().await;
        match &*guard {
            Some(runtime) => Ok(runtime.chat_proxy.clone()),
            None => Err(AppError::internal("Application state not initialized")),
        }
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        // Use try_read to avoid blocking
        if let Ok(guard) = self.database.try_read() {
            if let Some(ref db) = *guard {
                return db.is_healthy();
            }
        }
        false
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Get the effective configuration (file + environment overrides)
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => config.effective_config(),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration and rebuild the runtime
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let effective = {
            let mut guard = self.config.write().await;
            match &mut *guard {
                Some(config) => {
                    config.update_config(update)?;
                    config.effective_config()?
                }
                None => return Err(AppError::config("Config service not initialized")),
            }
        };
        self.rebuild_runtime(&effective).await?;
        Ok(effective)
    }

    /// Stop background work
    pub async fn shutdown(&self) {
        if let Some(runtime) = self.runtime.write().await.take() {
            runtime.dashboard.shutdown();
            if let Some(watcher) = runtime.watcher {
                let _ = watcher.await;
            }
        }
    }
}

/// Wire the dashboard and chat proxy for `config`.
///
/// A missing credential does not fail here: prompt features report it as a
/// configuration error when triggered, and backend features keep working.
pub fn build_runtime(
    config: &AppConfig,
    secrets: &ProviderSecrets,
    database: Database,
) -> AppResult<(Arc<Dashboard>, Arc<ChatProxy>)> {
    let store: Arc<dyn KeyValueStore> = Arc::new(database);
    let input = Arc::new(StoredInput::load(store.clone())?);
    let cache = AnalysisCache::new(store.clone(), config.cache_key_policy);
    let history = ReportHistory::new(store);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let provider = create_provider(config.provider_config(secrets));
    if let Err(e) = &provider {
        tracing::warn!("Prompt-driven features unavailable: {}", e);
    }
    let analytics = Arc::new(AnalyticsClient::new(
        config.analytics_base_url.clone(),
        timeout,
    ));
    let fetcher = Arc::new(FeatureFetcher::new(provider, analytics));

    let dashboard = Arc::new(Dashboard::new(
        input,
        cache,
        history,
        fetcher,
        timeout,
        config.auto_analyze,
    ));
    let chat_proxy = Arc::new(ChatProxy::new(
        config.upstream_chat_url.clone(),
        config.upstream_model.clone(),
        secrets.groq_api_key.clone(),
        timeout,
    ));

    Ok((dashboard, chat_proxy))
}
