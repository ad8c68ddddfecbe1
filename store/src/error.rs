//! Store error taxonomy (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database write failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("search {0} not found")]
    SearchNotFound(uuid::Uuid),

    #[error("invalid enum value persisted in column {column}: {value}")]
    InvalidEnumValue { column: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
