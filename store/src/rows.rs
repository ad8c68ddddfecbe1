//! Raw `FromRow` row shapes and their conversions to/from the domain types
//! in `archivist_models`. Kept separate from the domain types themselves
//! because several domain fields (enums, `SearchSpec`) are not 1:1 with a
//! Postgres column type.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use archivist_models::{Analysis, Message, QueryType, Search, SearchResult, SearchSpec, SearchStatus, SynthesisResult};

use crate::error::StoreError;

#[derive(Debug, FromRow)]
pub(crate) struct SearchRow {
    pub id: Uuid,
    pub search_number: i64,
    pub spec: serde_json::Value,
    pub real_question: String,
    pub query_type: String,
    pub status: String,
    pub messages_found: i32,
    pub analyzed: i32,
    pub relevant: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SearchRow {
    pub fn into_domain(self) -> crate::error::Result<Search> {
        let query_type = QueryType::from_str_loose(&self.query_type).ok_or_else(|| {
            StoreError::InvalidEnumValue {
                column: "query_type",
                value: self.query_type.clone(),
            }
        })?;
        let status = SearchStatus::from_str_loose(&self.status).ok_or_else(|| {
            StoreError::InvalidEnumValue {
                column: "status",
                value: self.status.clone(),
            }
        })?;
        let spec: SearchSpec = serde_json::from_value(self.spec).map_err(|_| {
            StoreError::InvalidEnumValue {
                column: "spec",
                value: "<unparseable spec json>".to_string(),
            }
        })?;

        Ok(Search {
            id: self.id,
            search_number: self.search_number,
            spec,
            real_question: self.real_question,
            query_type,
            status,
            messages_found: self.messages_found,
            analyzed: self.analyzed,
            relevant: self.relevant,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub upstream_id: i64,
    pub posted_at: DateTime<Utc>,
    pub from_display: String,
    pub from_email: Option<String>,
    pub listserv: String,
    pub subject: String,
    pub body: String,
    #[allow(dead_code)]
    pub body_length: i32,
    pub has_attachment: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            upstream_id: row.upstream_id,
            posted_at: row.posted_at,
            from_display: row.from_display,
            from_email: row.from_email,
            listserv: row.listserv,
            subject: row.subject,
            body: row.body,
            has_attachment: row.has_attachment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SearchResultRow {
    pub search_id: Uuid,
    pub message_id: Uuid,
    pub position: i32,
    pub page: i32,
}

impl From<SearchResultRow> for SearchResult {
    fn from(row: SearchResultRow) -> Self {
        SearchResult {
            search_id: row.search_id,
            message_id: row.message_id,
            position: row.position,
            page: row.page,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct AnalysisRow {
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

impl From<AnalysisRow> for Analysis {
    fn from(row: AnalysisRow) -> Self {
        Analysis {
            id: row.id,
            search_id: row.search_id,
            message_id: row.message_id,
            is_relevant: row.is_relevant,
            confidence: row.confidence,
            reasoning: row.reasoning,
            model_id: row.model_id,
            tokens_used: row.tokens_used,
            cost: row.cost,
            analyzed_at: row.analyzed_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SynthesisRow {
    pub search_id: Uuid,
    pub score: i32,
    pub evaluation: String,
    pub reasoning: String,
}

impl SynthesisRow {
    pub fn into_domain(self) -> crate::error::Result<SynthesisResult> {
        let evaluation = archivist_models::EvaluationLabel::from_str_loose(&self.evaluation)
            .ok_or_else(|| StoreError::InvalidEnumValue {
                column: "evaluation",
                value: self.evaluation.clone(),
            })?;

        Ok(SynthesisResult {
            search_id: self.search_id,
            score: self.score,
            evaluation,
            reasoning: self.reasoning,
        })
    }
}
