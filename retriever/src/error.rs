//! Retriever error taxonomy (spec.md §7): `RetrievalTimeout`, `UpstreamShape`,
//! `CookieExpired`. Per-message and per-page failures never reach these
//! variants directly — they are absorbed and logged at the call site
//! (spec.md §4.5 failure semantics) — these are reserved for failures that
//! abort the whole search.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrieverError {
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("upstream page did not have the expected shape: {0}")]
    Shape(String),

    #[error("authenticated session appears to have expired (cookie jar rotated or rejected)")]
    CookieExpired,

    #[error("browser navigation failed: {0}")]
    Navigation(String),

    #[error("failed to read cookie jar at {path}: {source}")]
    CookieJar {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RetrieverError>;
