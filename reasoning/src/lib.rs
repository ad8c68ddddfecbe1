//! The reasoning service boundary (spec.md §6): a chat-style completion API
//! with JSON-object output, used by the Clarifier, QueryPlanner, Scorer and
//! Synthesizer. Nothing here depends on a particular provider.

pub mod client;
pub mod cost;
pub mod error;
pub mod json_extract;

pub use client::{ReasoningClient, ReasoningResponse};
pub use cost::{estimate_cost, UsageTotals};
pub use error::ReasoningError;
pub use json_extract::{extract_json, first_json_object};
