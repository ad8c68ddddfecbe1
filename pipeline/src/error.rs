//! Pipeline-level error taxonomy (spec.md §7, §9.2). Per-item failures
//! (a skipped page, a skipped message, a default verdict) are absorbed at
//! their own layer and never reach here; `PipelineError` only carries the
//! handful of conditions that promote a search to `failed`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store operation failed: {0}")]
    Store(#[from] archivist_store::StoreError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] archivist_retriever::RetrieverError),

    #[error("search {0} does not exist")]
    SearchNotFound(uuid::Uuid),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
