//! `Message` and `SearchResult` (spec.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Model;

/// The shortest body the store will treat as real content rather than a
/// placeholder left by a failed per-message fetch (spec.md §3, I5).
pub const PLACEHOLDER_BODY_MAX_LEN: usize = 10;

/// One archive message, globally deduplicated by `upstream_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// The archive's own numeric id; unique across all messages (I1).
    pub upstream_id: i64,
    pub posted_at: DateTime<Utc>,
    pub from_display: String,
    pub from_email: Option<String>,
    pub listserv: String,
    pub subject: String,
    /// Plain text, cleaned of nested quotes only when they would mislead
    /// the scorer; otherwise full thread context is preserved.
    pub body: String,
    pub has_attachment: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn body_length(&self) -> usize {
        self.body.chars().count()
    }

    /// Whether `body` is short enough to be a placeholder rather than real
    /// content (a failed fetch that still emitted a record, spec.md §4.5.3).
    pub fn is_placeholder_body(body: &str) -> bool {
        body.chars().count() < PLACEHOLDER_BODY_MAX_LEN
    }

    /// Which of two bodies for the same `upstream_id` the store should keep
    /// (I5 / R2): prefer the longer body, unless the existing one is a
    /// placeholder, in which case the incoming body always wins.
    pub fn preferred_body<'a>(existing: &'a str, incoming: &'a str) -> &'a str {
        if Self::is_placeholder_body(existing) {
            return incoming;
        }
        if incoming.chars().count() > existing.chars().count() {
            incoming
        } else {
            existing
        }
    }
}

impl Model for Message {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Many-to-many link between a search and a message, unique on
/// `(search_id, message_id)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchResult {
    pub search_id: Uuid,
    pub message_id: Uuid,
    /// 1-based rank in the upstream result list, across all pages.
    pub position: i32,
    /// Upstream pagination page this row was seen on.
    pub page: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_always_loses_to_incoming() {
        assert_eq!(Message::preferred_body("hi", "a proper message body"), "a proper message body");
    }

    #[test]
    fn longer_non_placeholder_body_wins() {
        assert_eq!(Message::preferred_body("short original text", "short"), "short original text");
    }

    #[test]
    fn shorter_incoming_does_not_shrink_existing() {
        let existing = "a message body with real substance in it";
        assert_eq!(Message::preferred_body(existing, "short reply"), existing);
    }
}
