//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod analysis_cache;
pub mod analytics_client;
pub mod chat_proxy;
pub mod dashboard;
pub mod fetcher;
pub mod orchestrator;
pub mod prompts;
pub mod report_history;
pub mod stored_input;

pub use analysis_cache::{cache_key, AnalysisCache};
pub use analytics_client::AnalyticsClient;
pub use chat_proxy::{ChatProxy, ProxyReply};
pub use dashboard::Dashboard;
pub use fetcher::{AnalysisFetcher, FeatureFetcher};
pub use orchestrator::AnalysisOrchestrator;
pub use report_history::{ReportHistory, MAX_SAVED_REPORTS};
pub use stored_input::{StoredInput, STORED_INPUT_KEY};
