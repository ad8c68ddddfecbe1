//! `Feedback`: optional user-supplied quality signal (spec.md §3). Append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a piece of feedback is attached to: a search's synthesis, or a
/// single (search, message) analysis (spec.md §6's two feedback tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FeedbackTarget {
    Synthesis { search_id: Uuid },
    MessageAnalysis { search_id: Uuid, message_id: Uuid },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub target: FeedbackTarget,
    pub is_positive: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
