// Repository pattern for store operations, one file per entity.

pub mod analysis;
pub mod feedback;
pub mod message;
pub mod result;
pub mod search;
pub mod synthesis;

pub use analysis::AnalysisRepository;
pub use feedback::FeedbackRepository;
pub use message::{MessageRepository, NewMessage};
pub use result::SearchResultRepository;
pub use search::SearchRepository;
pub use synthesis::SynthesisRepository;
