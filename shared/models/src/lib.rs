//! Data model for the research pipeline: value types shared by the store,
//! the query planner, the retriever, and the scoring/synthesis stages.
//!
//! `spec` holds the `SearchSpec` value type and its upstream form mapping;
//! the remaining modules hold the persisted entities (`Search`, `Message`,
//! `SearchResult`, `Analysis`, `SynthesisResult`, `Feedback`) in the shape
//! the store reads and writes them.

pub mod analysis;
pub mod feedback;
pub mod message;
pub mod search;
pub mod spec;
pub mod synthesis;

pub use analysis::Analysis;
pub use feedback::Feedback;
pub use message::{Message, SearchResult};
pub use search::{QueryType, Search, SearchStatus};
pub use spec::{AttachmentFilter, Listserv, SearchIn, SearchSpec};
pub use synthesis::{EvaluationLabel, SynthesisResult};

use chrono::{DateTime, Utc};

/// Common accessors for persisted entities, mirrored from the store's
/// repository layer so generic helpers can work across entity types.
pub trait Model {
    type Id;

    fn id(&self) -> &Self::Id;
    fn created_at(&self) -> DateTime<Utc>;
}
