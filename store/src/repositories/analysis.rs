use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use archivist_models::{Analysis, Verdict};

use crate::error::Result;
use crate::rows::AnalysisRow;

pub struct AnalysisRepository {
    pool: PgPool,
}

impl AnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert on (search_id, message_id). Per spec.md §4.6, a pre-existing
    /// Analysis is left untouched unless `force` is set (explicit re-analysis
    /// request); this keeps the common-path upsert a no-op, matching I1.
    pub async fn upsert(
        &self,
        search_id: Uuid,
        message_id: Uuid,
        verdict: Verdict,
        model_id: &str,
        tokens_used: i32,
        cost: f64,
        force: bool,
    ) -> Result<()> {
        let verdict = verdict.clamp_confidence();

        if force {
            sqlx::query(
                r#"
                INSERT INTO analyses
                    (id, search_id, message_id, is_relevant, confidence, reasoning, model_id, tokens_used, cost, analyzed_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (search_id, message_id) DO UPDATE SET
                    is_relevant = EXCLUDED.is_relevant,
                    confidence = EXCLUDED.confidence,
                    reasoning = EXCLUDED.reasoning,
                    model_id = EXCLUDED.model_id,
                    tokens_used = EXCLUDED.tokens_used,
                    cost = EXCLUDED.cost,
                    analyzed_at = EXCLUDED.analyzed_at
                "#,
            )
        } else {
            sqlx::query(
                r#"
                INSERT INTO analyses
                    (id, search_id, message_id, is_relevant, confidence, reasoning, model_id, tokens_used, cost, analyzed_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (search_id, message_id) DO NOTHING
                "#,
            )
        }
        .bind(Uuid::new_v4())
        .bind(search_id)
        .bind(message_id)
        .bind(verdict.is_relevant)
        .bind(verdict.confidence)
        .bind(&verdict.reasoning)
        .bind(model_id)
        .bind(tokens_used)
        .bind(cost)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn exists(&self, search_id: Uuid, message_id: Uuid) -> Result<bool> {
        let found: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM analyses WHERE search_id = $1 AND message_id = $2",
        )
        .bind(search_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn for_search(&self, search_id: Uuid) -> Result<Vec<Analysis>> {
        let rows = sqlx::query_as::<_, AnalysisRow>(
            "SELECT * FROM analyses WHERE search_id = $1",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Analysis::from).collect())
    }
}
