use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use archivist_models::Message;

use crate::error::Result;
use crate::rows::MessageRow;

/// A normalized message record as emitted by the Retriever, before it has
/// been assigned a store-local id.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub upstream_id: i64,
    pub posted_at: DateTime<Utc>,
    pub from_display: String,
    pub from_email: Option<String>,
    pub listserv: String,
    pub subject: String,
    pub body: String,
    pub has_attachment: bool,
}

pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Dedupes by `upstream_id`; merges body length per I5 (never shrink a
    /// real body below what was previously persisted).
    pub async fn upsert(&self, record: NewMessage) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages WHERE upstream_id = $1 FOR UPDATE",
        )
        .bind(record.upstream_id)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO messages
                        (id, upstream_id, posted_at, from_display, from_email, listserv,
                         subject, body, body_length, has_attachment, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                    "#,
                )
                .bind(id)
                .bind(record.upstream_id)
                .bind(record.posted_at)
                .bind(&record.from_display)
                .bind(&record.from_email)
                .bind(&record.listserv)
                .bind(&record.subject)
                .bind(&record.body)
                .bind(record.body.chars().count() as i32)
                .bind(record.has_attachment)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                id
            }
            Some(row) => {
                let preferred = Message::preferred_body(&row.body, &record.body).to_string();
                if preferred != row.body {
                    sqlx::query(
                        "UPDATE messages SET body = $1, body_length = $2 WHERE id = $3",
                    )
                    .bind(&preferred)
                    .bind(preferred.chars().count() as i32)
                    .bind(row.id)
                    .execute(&mut *tx)
                    .await?;
                }
                row.id
            }
        };

        tx.commit().await?;
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Message::from))
    }
}
