//! `Analysis`: per (search, message) scoring verdict (spec.md §3, §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The Scorer's raw judgment for one message, before it is wrapped with
/// usage accounting and persisted as an `Analysis` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_relevant: bool,
    /// Clamped to [0, 1] (spec.md §8 P6).
    pub confidence: f64,
    /// Short natural-language text referencing the REAL question, never
    /// the raw keywords that retrieved the message.
    pub reasoning: String,
}

impl Verdict {
    /// The conservative default persisted when the Scorer's JSON reply
    /// could not be parsed (spec.md §4.6, `ScorerParseFailure`).
    pub fn parse_failure() -> Self {
        Self {
            is_relevant: false,
            confidence: 0.0,
            reasoning: "Failed to parse".to_string(),
        }
    }

    pub fn clamp_confidence(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

/// Persisted scoring verdict for one (search, message) pair. Unique on
/// `(search_id, message_id)`; writes are upsert-idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: Uuid,
    pub search_id: Uuid,
    pub message_id: Uuid,
    pub is_relevant: bool,
    pub confidence: f64,
    pub reasoning: String,
    pub model_id: String,
    pub tokens_used: i32,
    pub cost: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl Analysis {
    pub fn from_verdict(
        id: Uuid,
        search_id: Uuid,
        message_id: Uuid,
        verdict: Verdict,
        model_id: String,
        tokens_used: i32,
        cost: f64,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        let verdict = verdict.clamp_confidence();
        Self {
            id,
            search_id,
            message_id,
            is_relevant: verdict.is_relevant,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            model_id,
            tokens_used,
            cost,
            analyzed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_confidence_bounds_to_unit_interval() {
        let v = Verdict {
            is_relevant: true,
            confidence: 1.4,
            reasoning: "x".to_string(),
        }
        .clamp_confidence();
        assert_eq!(v.confidence, 1.0);

        let v = Verdict {
            is_relevant: true,
            confidence: -0.2,
            reasoning: "x".to_string(),
        }
        .clamp_confidence();
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn parse_failure_is_conservative() {
        let v = Verdict::parse_failure();
        assert!(!v.is_relevant);
        assert_eq!(v.confidence, 0.0);
    }
}
