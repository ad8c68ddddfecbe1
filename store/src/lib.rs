//! Durable state for the research pipeline (spec.md §4.2).
//!
//! `Store` owns every persisted entity: searches, messages, results,
//! analyses, synthesis results, feedback. It is the single-writer boundary
//! for a given `search_id` (the Orchestrator for that search is the only
//! caller mutating it), so plain per-statement transactions suffice without
//! row locks, per spec.md §4.2's concurrency note.

pub mod error;
mod repositories;
mod rows;

pub use error::{Result, StoreError};
pub use repositories::NewMessage;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use archivist_config::StoreConfig;
use archivist_models::{
    Analysis, FeedbackTarget, Message, QueryType, Search, SearchSpec, SearchStatus, SynthesisResult, Verdict,
};

use repositories::{
    AnalysisRepository, FeedbackRepository, MessageRepository, SearchRepository,
    SearchResultRepository, SynthesisRepository,
};

/// One row of `relevant_results`: a message joined with its scoring verdict
/// and its position in the upstream result list.
#[derive(Debug, Clone)]
pub struct RelevantResult {
    pub message: Message,
    pub analysis: Analysis,
    pub position: i32,
    pub page: i32,
}

/// One row of `linked_messages`: every message linked to a search, scored
/// or not, in upstream order.
#[derive(Debug, Clone)]
pub struct LinkedMessage {
    pub message: Message,
    pub position: i32,
    pub page: i32,
}

/// Counts and average confidence for a search, per spec.md §4.2.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub messages_found: i32,
    pub analyzed: i32,
    pub relevant: i32,
    pub average_confidence: Option<f64>,
}

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    fn searches(&self) -> SearchRepository {
        SearchRepository::new(self.pool.clone())
    }

    fn messages(&self) -> MessageRepository {
        MessageRepository::new(self.pool.clone())
    }

    fn results(&self) -> SearchResultRepository {
        SearchResultRepository::new(self.pool.clone())
    }

    fn analyses(&self) -> AnalysisRepository {
        AnalysisRepository::new(self.pool.clone())
    }

    fn syntheses(&self) -> SynthesisRepository {
        SynthesisRepository::new(self.pool.clone())
    }

    fn feedback(&self) -> FeedbackRepository {
        FeedbackRepository::new(self.pool.clone())
    }

    // ---- Operations named in spec.md §4.2 ----

    pub async fn create_search(
        &self,
        spec: &SearchSpec,
        real_question: &str,
        query_type: QueryType,
    ) -> Result<Uuid> {
        self.searches().create(spec, real_question, query_type).await
    }

    pub async fn set_search_status(
        &self,
        id: Uuid,
        status: SearchStatus,
        messages_found: Option<i32>,
        analyzed: Option<i32>,
        relevant: Option<i32>,
    ) -> Result<()> {
        self.searches()
            .set_status(id, status, messages_found, analyzed, relevant)
            .await
    }

    pub async fn upsert_message(&self, record: NewMessage) -> Result<Uuid> {
        self.messages().upsert(record).await
    }

    pub async fn link_result(&self, search_id: Uuid, message_id: Uuid, position: i32, page: i32) -> Result<()> {
        self.results().link(search_id, message_id, position, page).await
    }

    pub async fn upsert_analysis(
        &self,
        search_id: Uuid,
        message_id: Uuid,
        verdict: Verdict,
        model_id: &str,
        tokens_used: i32,
        cost: f64,
    ) -> Result<()> {
        self.analyses()
            .upsert(search_id, message_id, verdict, model_id, tokens_used, cost, false)
            .await
    }

    /// Explicit re-analysis, bypassing the idempotence skip in `upsert_analysis`.
    pub async fn reanalyze(
        &self,
        search_id: Uuid,
        message_id: Uuid,
        verdict: Verdict,
        model_id: &str,
        tokens_used: i32,
        cost: f64,
    ) -> Result<()> {
        self.analyses()
            .upsert(search_id, message_id, verdict, model_id, tokens_used, cost, true)
            .await
    }

    pub async fn save_synthesis(&self, synthesis: &SynthesisResult) -> Result<()> {
        self.syntheses().save(synthesis).await
    }

    pub async fn record_feedback(
        &self,
        target: FeedbackTarget,
        is_positive: bool,
        comment: Option<String>,
    ) -> Result<Uuid> {
        self.feedback().record(target, is_positive, comment).await
    }

    // ---- Query helpers ----

    pub async fn get_search(&self, id: Uuid) -> Result<Search> {
        self.searches().get(id).await
    }

    pub async fn recent_searches(&self, limit: i64) -> Result<Vec<Search>> {
        self.searches().recent(limit).await
    }

    pub async fn get_synthesis(&self, search_id: Uuid) -> Result<Option<SynthesisResult>> {
        self.syntheses().find(search_id).await
    }

    pub async fn analyses_for(&self, search_id: Uuid) -> Result<Vec<Analysis>> {
        self.analyses().for_search(search_id).await
    }

    /// Whether an Analysis already exists for (search, message) — the
    /// Scorer checks this before spending a reasoning-service call, since
    /// `upsert_analysis` is a no-op for an existing row anyway (spec.md
    /// §4.6 idempotence).
    pub async fn analysis_exists(&self, search_id: Uuid, message_id: Uuid) -> Result<bool> {
        self.analyses().exists(search_id, message_id).await
    }

    /// Joins messages, analyses, and results for a search; preserves
    /// `position` order; returns only the messages the Scorer marked
    /// relevant (spec.md §4.2).
    pub async fn relevant_results(&self, search_id: Uuid) -> Result<Vec<RelevantResult>> {
        let rows: Vec<(rows::MessageRow, rows::AnalysisRow, i32, i32)> = sqlx::query_as(
            r#"
            SELECT
                m.id, m.upstream_id, m.posted_at, m.from_display, m.from_email, m.listserv,
                m.subject, m.body, m.body_length, m.has_attachment, m.created_at,
                a.id, a.search_id, a.message_id, a.is_relevant, a.confidence, a.reasoning,
                a.model_id, a.tokens_used, a.cost, a.analyzed_at,
                r.position, r.page
            FROM search_results r
            JOIN messages m ON m.id = r.message_id
            JOIN analyses a ON a.search_id = r.search_id AND a.message_id = r.message_id
            WHERE r.search_id = $1 AND a.is_relevant = true
            ORDER BY r.position ASC
            "#,
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(m, a, position, page)| RelevantResult {
                message: m.into(),
                analysis: a.into(),
                position,
                page,
            })
            .collect())
    }

    /// Every message linked to a search (scored or not), in upstream order —
    /// the Scorer's input set, as opposed to `relevant_results` which is the
    /// Synthesizer's (already-filtered) input set.
    pub async fn linked_messages(&self, search_id: Uuid) -> Result<Vec<LinkedMessage>> {
        let rows: Vec<(rows::MessageRow, i32, i32)> = sqlx::query_as(
            r#"
            SELECT
                m.id, m.upstream_id, m.posted_at, m.from_display, m.from_email, m.listserv,
                m.subject, m.body, m.body_length, m.has_attachment, m.created_at,
                r.position, r.page
            FROM search_results r
            JOIN messages m ON m.id = r.message_id
            WHERE r.search_id = $1
            ORDER BY r.position ASC
            "#,
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(m, position, page)| LinkedMessage { message: m.into(), position, page })
            .collect())
    }

    /// Counts and average confidence for a search (spec.md §4.2).
    pub async fn search_stats(&self, search_id: Uuid) -> Result<SearchStats> {
        let search = self.get_search(search_id).await?;

        let average_confidence: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(confidence) FROM analyses WHERE search_id = $1",
        )
        .bind(search_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SearchStats {
            messages_found: search.messages_found,
            analyzed: search.analyzed,
            relevant: search.relevant,
            average_confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_stats_default_has_no_confidence() {
        let stats = SearchStats::default();
        assert_eq!(stats.messages_found, 0);
        assert!(stats.average_confidence.is_none());
    }
}
