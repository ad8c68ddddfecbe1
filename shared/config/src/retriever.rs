use std::env;
use std::time::Duration;

/// Settings for the Retriever's headless-browser session against the
/// upstream archive (spec.md §4.5, §5, §6).
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub search_url: String,
    pub cookie_jar_path: String,
    pub page_load_timeout: Duration,
    pub results_wait_timeout: Duration,
    pub message_wait_timeout: Duration,
    pub pagination_pause: Duration,
    pub fetch_pause: Duration,
}

impl RetrieverConfig {
    pub fn from_env() -> Self {
        Self {
            search_url: env::var("UPSTREAM_SEARCH_URL")
                .unwrap_or_else(|_| "https://www.example-listserv.org/?pg=search".to_string()),
            cookie_jar_path: env::var("COOKIE_JAR_PATH")
                .unwrap_or_else(|_| "auth.json".to_string()),
            page_load_timeout: Duration::from_secs(env_parse("PAGE_LOAD_TIMEOUT_SECS", 60)),
            results_wait_timeout: Duration::from_secs(env_parse("RESULTS_WAIT_TIMEOUT_SECS", 30)),
            message_wait_timeout: Duration::from_secs(env_parse("MESSAGE_WAIT_TIMEOUT_SECS", 10)),
            pagination_pause: Duration::from_millis(env_parse("PAGINATION_PAUSE_MS", 2000)),
            fetch_pause: Duration::from_millis(env_parse("FETCH_PAUSE_MS", 2000)),
        }
    }

    pub fn for_test() -> Self {
        Self {
            search_url: "https://listserv.test/?pg=search".to_string(),
            cookie_jar_path: "test-auth.json".to_string(),
            page_load_timeout: Duration::from_millis(500),
            results_wait_timeout: Duration::from_millis(500),
            message_wait_timeout: Duration::from_millis(200),
            pagination_pause: Duration::from_millis(1),
            fetch_pause: Duration::from_millis(1),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
