use std::env;

/// Connection settings for the durable Store (spec.md §4.2 / §6).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            max_connections: env_parse("STORE_MAX_CONNECTIONS", 20),
            min_connections: env_parse("STORE_MIN_CONNECTIONS", 5),
            connect_timeout_seconds: env_parse("STORE_CONNECT_TIMEOUT", 30),
            idle_timeout_seconds: env_parse("STORE_IDLE_TIMEOUT", 600),
        }
    }

    pub fn for_test(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 5,
            idle_timeout_seconds: 60,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
