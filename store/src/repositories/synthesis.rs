use sqlx::PgPool;
use uuid::Uuid;

use archivist_models::SynthesisResult;

use crate::error::Result;
use crate::rows::SynthesisRow;

pub struct SynthesisRepository {
    pool: PgPool,
}

impl SynthesisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// At most one per search (I6); a retried synthesis overwrites.
    pub async fn save(&self, synthesis: &SynthesisResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO synthesis_results (search_id, score, evaluation, reasoning)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (search_id) DO UPDATE SET
                score = EXCLUDED.score,
                evaluation = EXCLUDED.evaluation,
                reasoning = EXCLUDED.reasoning
            "#,
        )
        .bind(synthesis.search_id)
        .bind(synthesis.score)
        .bind(synthesis.evaluation.as_str())
        .bind(&synthesis.reasoning)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find(&self, search_id: Uuid) -> Result<Option<SynthesisResult>> {
        let row = sqlx::query_as::<_, SynthesisRow>(
            "SELECT * FROM synthesis_results WHERE search_id = $1",
        )
        .bind(search_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SynthesisRow::into_domain).transpose()
    }
}
