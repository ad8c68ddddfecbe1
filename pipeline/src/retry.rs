//! Single-retry wrapper around Store writes (spec.md §7 `StoreFailure`: "a
//! database write failed. Propagates; the current step retries once; a
//! second failure promotes the search to `failed`"). Uses
//! `archivist_observability::log_retry!`, authored for exactly this and
//! otherwise dead.

use std::future::Future;

use archivist_store::StoreError;

use crate::error::{PipelineError, Result};

/// Run `make()`, retrying once on failure before giving up. `make` builds a
/// fresh future per call rather than being awaited twice, so every call site
/// only needs to be safe to invoke twice (`Copy` arguments, or a small owned
/// value cloned per attempt).
pub(crate) async fn with_retry<T, Fut>(operation: &'static str, mut make: impl FnMut() -> Fut) -> Result<T>
where
    Fut: Future<Output = std::result::Result<T, StoreError>>,
{
    match make().await {
        Ok(value) => Ok(value),
        Err(first_error) => {
            archivist_observability::log_retry!(operation, 1, 2, first_error);
            make().await.map_err(PipelineError::Store)
        }
    }
}
