//! Per-stage progress callback (SPEC_FULL §10.4), generalized from
//! `scraper.py`'s `progress_callback(status, current, total)` into a trait
//! the Retriever and Scorer both call into. The Orchestrator implements it
//! by writing through to the Store's status counters; this module only
//! defines the seam.

/// One progress update: a human-readable status line plus a `current/total`
/// counter. Implementors decide what to do with it (log, persist, ignore).
pub trait ProgressSink: Send + Sync {
    fn report(&self, status: &str, current: u32, total: u32);
}

/// A sink that only logs at `debug` level, useful for tests and for callers
/// that don't need Store-backed progress counters.
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn report(&self, status: &str, current: u32, total: u32) {
        tracing::debug!(status, current, total, "progress");
    }
}
