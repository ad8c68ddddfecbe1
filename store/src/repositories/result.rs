use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

pub struct SearchResultRepository {
    pool: PgPool,
}

impl SearchResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent on (search_id, message_id) (I2, spec.md §8 I2).
    pub async fn link(&self, search_id: Uuid, message_id: Uuid, position: i32, page: i32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO search_results (search_id, message_id, position, page)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (search_id, message_id) DO NOTHING
            "#,
        )
        .bind(search_id)
        .bind(message_id)
        .bind(position)
        .bind(page)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
