use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use archivist_models::{QueryType, Search, SearchSpec, SearchStatus};

use crate::error::{Result, StoreError};
use crate::rows::SearchRow;

pub struct SearchRepository {
    pool: PgPool,
}

impl SearchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        spec: &SearchSpec,
        real_question: &str,
        query_type: QueryType,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let spec_json = serde_json::to_value(spec).expect("SearchSpec always serializes");

        let next_number: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(search_number), 0) + 1 FROM searches",
        )
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO searches (id, search_number, spec, real_question, query_type, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(next_number)
        .bind(spec_json)
        .bind(real_question)
        .bind(query_type.as_str())
        .bind(SearchStatus::Pending.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Transitions must obey the state machine in spec.md §4.8: `started_at`
    /// is stamped on the first move into `running`; `completed_at` is
    /// stamped on any move into a terminal status.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: SearchStatus,
        messages_found: Option<i32>,
        analyzed: Option<i32>,
        relevant: Option<i32>,
    ) -> Result<()> {
        let now = Utc::now();
        let starting = matches!(status, SearchStatus::Running);
        let terminal = status.is_terminal();

        sqlx::query(
            r#"
            UPDATE searches
            SET status = $1,
                messages_found = COALESCE($2, messages_found),
                analyzed = COALESCE($3, analyzed),
                relevant = COALESCE($4, relevant),
                started_at = CASE WHEN $5 AND started_at IS NULL THEN $6 ELSE started_at END,
                completed_at = CASE WHEN $7 THEN $6 ELSE completed_at END
            WHERE id = $8
            "#,
        )
        .bind(status.as_str())
        .bind(messages_found)
        .bind(analyzed)
        .bind(relevant)
        .bind(starting)
        .bind(now)
        .bind(terminal)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Search>> {
        let row = sqlx::query_as::<_, SearchRow>("SELECT * FROM searches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SearchRow::into_domain).transpose()
    }

    pub async fn get(&self, id: Uuid) -> Result<Search> {
        self.find_by_id(id).await?.ok_or(StoreError::SearchNotFound(id))
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Search>> {
        let rows = sqlx::query_as::<_, SearchRow>(
            "SELECT * FROM searches ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SearchRow::into_domain).collect()
    }
}
