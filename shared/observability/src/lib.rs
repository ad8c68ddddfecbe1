//! Observability infrastructure for the research pipeline.
//!
//! # Features
//! - Structured JSON (prod) or pretty (dev) logging via `tracing-subscriber`
//! - Timed-stage, external-call, retry, and item-skip logging macros
//!
//! There is no HTTP surface in this crate (the REST front-end is an external
//! collaborator, spec.md §1), so request/response middleware and trace-id
//! propagation headers are not part of this library.

pub mod init;
pub mod macros;

pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Instrument, Level};
