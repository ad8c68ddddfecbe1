use std::env;
use std::time::Duration;

/// Settings for the chat-completion reasoning service consulted by the
/// Clarifier, QueryPlanner, Scorer and Synthesizer (spec.md §6).
///
/// The core depends only on a chat-style completion API with JSON-object
/// output; `api_base`/`model` make the provider swappable without touching
/// call sites.
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub api_base: Option<String>,
    pub api_key: String,
    pub model: String,
    pub planner_model: String,
    pub scorer_model: String,
    pub synthesis_model: String,
    pub request_timeout: Duration,
    pub clarifier_max_tokens: u16,
    pub planner_max_tokens: u16,
    pub scorer_max_tokens: u16,
    pub synthesis_max_tokens: u16,
}

impl ReasoningConfig {
    pub fn from_env() -> Self {
        let default_model =
            env::var("REASONING_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Self {
            api_base: env::var("REASONING_API_BASE").ok(),
            api_key: env::var("REASONING_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .expect("REASONING_API_KEY or OPENAI_API_KEY must be set"),
            planner_model: env::var("PLANNER_MODEL").unwrap_or_else(|_| default_model.clone()),
            scorer_model: env::var("SCORER_MODEL").unwrap_or_else(|_| default_model.clone()),
            synthesis_model: env::var("SYNTHESIS_MODEL")
                .unwrap_or_else(|_| default_model.clone()),
            model: default_model,
            request_timeout: Duration::from_secs(env_parse("REASONING_TIMEOUT_SECS", 60)),
            clarifier_max_tokens: env_parse("CLARIFIER_MAX_TOKENS", 300),
            planner_max_tokens: env_parse("PLANNER_MAX_TOKENS", 800),
            scorer_max_tokens: env_parse("SCORER_MAX_TOKENS", 500),
            synthesis_max_tokens: env_parse("SYNTHESIS_MAX_TOKENS", 900),
        }
    }

    pub fn for_test() -> Self {
        Self {
            api_base: None,
            api_key: "test-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            planner_model: "gpt-4o-mini".to_string(),
            scorer_model: "gpt-4o-mini".to_string(),
            synthesis_model: "gpt-4o-mini".to_string(),
            request_timeout: Duration::from_secs(5),
            clarifier_max_tokens: 300,
            planner_max_tokens: 800,
            scorer_max_tokens: 500,
            synthesis_max_tokens: 900,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
