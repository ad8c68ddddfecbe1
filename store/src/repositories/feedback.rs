use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use archivist_models::FeedbackTarget;

use crate::error::Result;

pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append-only; feedback is never edited or deleted.
    pub async fn record(&self, target: FeedbackTarget, is_positive: bool, comment: Option<String>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        match target {
            FeedbackTarget::Synthesis { search_id } => {
                sqlx::query(
                    "INSERT INTO synthesis_feedback (id, search_id, is_positive, comment, created_at) VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(id)
                .bind(search_id)
                .bind(is_positive)
                .bind(&comment)
                .bind(now)
                .execute(&self.pool)
                .await?;
            }
            FeedbackTarget::MessageAnalysis { search_id, message_id } => {
                sqlx::query(
                    "INSERT INTO message_feedback (id, search_id, message_id, is_positive, comment, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(id)
                .bind(search_id)
                .bind(message_id)
                .bind(is_positive)
                .bind(&comment)
                .bind(now)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(id)
    }
}
