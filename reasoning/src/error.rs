//! Reasoning-service error taxonomy (spec.md §7, `ReasoningUnavailable`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("reasoning service unreachable: {0}")]
    Unavailable(#[from] async_openai::error::OpenAIError),

    #[error("reasoning service returned no completion choices")]
    EmptyResponse,
}
