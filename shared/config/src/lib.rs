//! Environment-driven configuration for the research pipeline.
//!
//! Mirrors the teacher's `shared/config` + `database::config` split: each
//! component gets its own config struct loaded from env, aggregated here into
//! one `AppConfig` for the worker binary.

pub mod reasoning;
pub mod retriever;
pub mod store;

pub use reasoning::ReasoningConfig;
pub use retriever::RetrieverConfig;
pub use store::StoreConfig;

/// Aggregate configuration for the search-worker process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub reasoning: ReasoningConfig,
    pub retriever: RetrieverConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            tracing::debug!("no .env file found, relying on process environment");
        }

        Self {
            store: StoreConfig::from_env(),
            reasoning: ReasoningConfig::from_env(),
            retriever: RetrieverConfig::from_env(),
        }
    }

    pub fn for_test(database_url: impl Into<String>) -> Self {
        Self {
            store: StoreConfig::for_test(database_url),
            reasoning: ReasoningConfig::for_test(),
            retriever: RetrieverConfig::for_test(),
        }
    }
}