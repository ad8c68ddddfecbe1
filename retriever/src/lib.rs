//! The Retriever (spec.md §4.5): drives an authenticated headless browser
//! through the upstream search form, paginates results, and fetches each
//! message's full body. Grounded on the original Playwright-based
//! `scraper.py`, reimplemented against `headless_chrome` + `scraper` the
//! way the teacher's `indexers::services::web` parses fetched HTML.

pub mod cookie_jar;
pub mod error;
pub mod extract;
pub mod form;
pub mod progress;
pub mod retriever;
pub mod session;

pub use error::{Result, RetrieverError};
pub use progress::{NoopProgressSink, ProgressSink};
pub use retriever::{Retriever, RetrievedMessage};
