//! The Retriever (spec.md §4.5): turns a `SearchSpec` into a bounded,
//! ordered stream of fully-populated message records. Grounded on
//! `scraper.py`'s `CAAAScraper.scrape` for the three-stage shape (execute
//! search, extract ids across pages, fetch each message), reimplemented
//! synchronously against `headless_chrome`/`scraper` and run off the async
//! executor via `spawn_blocking` since a single browser context must never
//! be driven from two tasks at once (spec.md §4.5 "Back-off").

use std::sync::Arc;

use chrono::{DateTime, Utc};

use archivist_config::RetrieverConfig;
use archivist_models::{Message, SearchSpec};

use crate::error::{Result, RetrieverError};
use crate::extract::{self, RawResultRow};
use crate::progress::ProgressSink;
use crate::session::Session;

/// One fully-populated message, ready to be handed to the Store (spec.md
/// §4.5, §3's `Message` + `SearchResult` fields combined for convenience).
#[derive(Debug, Clone)]
pub struct RetrievedMessage {
    pub upstream_id: i64,
    pub posted_at: DateTime<Utc>,
    pub from_display: String,
    pub from_email: Option<String>,
    pub listserv: String,
    pub subject: String,
    pub body: String,
    pub has_attachment: bool,
    pub position: u32,
    pub page: u32,
}

pub struct Retriever {
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(config: RetrieverConfig) -> Self {
        Self { config }
    }

    /// Run one complete retrieval for `spec`, in a blocking thread.
    pub async fn retrieve(
        &self,
        spec: SearchSpec,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Vec<RetrievedMessage>> {
        let config = self.config.clone();

        archivist_observability::log_timed!("retriever.retrieve", {
            tokio::task::spawn_blocking(move || retrieve_sync(&config, &spec, progress.as_ref()))
                .await
                .map_err(|e| RetrieverError::Navigation(format!("retriever task panicked: {e}")))?
        })
    }
}

fn retrieve_sync(
    config: &RetrieverConfig,
    spec: &SearchSpec,
    progress: &dyn ProgressSink,
) -> Result<Vec<RetrievedMessage>> {
    progress.report("Executing search...", 0, spec.max_messages);

    let session = Session::attach(config)?;
    let form = spec.to_upstream_form();
    session.execute_search(&form)?;

    progress.report("Extracting message IDs...", 0, spec.max_messages);
    let rows = collect_result_rows(&session, spec, progress)?;

    progress.report(&format!("Found {} messages", rows.len()), rows.len() as u32, spec.max_messages);
    Ok(fetch_message_bodies(&session, rows, progress))
}

/// Stage 2: paginate and collect rows in upstream order (spec.md §4.5
/// "Pagination", "Ordering guarantee", "Failure semantics").
fn collect_result_rows(
    session: &Session,
    spec: &SearchSpec,
    _progress: &dyn ProgressSink,
) -> Result<Vec<RawResultRow>> {
    let mut rows: Vec<RawResultRow> = Vec::new();
    let mut current_page = 1u32;

    loop {
        if current_page > spec.max_pages || rows.len() as u32 >= spec.max_messages {
            break;
        }

        let html = session.page_html()?;
        match extract::parse_result_rows(&html, current_page, rows.len() as u32) {
            Ok(mut page_rows) => rows.append(&mut page_rows),
            Err(e) => {
                tracing::warn!(page = current_page, error = %e, "aborting pagination, keeping already-collected rows");
                break;
            }
        }

        if rows.len() as u32 >= spec.max_messages || current_page >= spec.max_pages {
            break;
        }

        match session.go_to_next_page(current_page + 1) {
            Ok(true) => current_page += 1,
            Ok(false) => {
                tracing::debug!("no further pagination control found, stopping");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "pagination navigation failed, stopping");
                break;
            }
        }
    }

    rows.truncate(spec.max_messages as usize);
    Ok(rows)
}

/// Stage 3: fetch each message's full body (spec.md §4.5 "Per-message
/// fetch"). Per-message failures are skipped and logged; they never fail
/// the whole search.
fn fetch_message_bodies(
    session: &Session,
    rows: Vec<RawResultRow>,
    progress: &dyn ProgressSink,
) -> Vec<RetrievedMessage> {
    let total = rows.len() as u32;
    let mut messages = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        progress.report("Fetching message content...", i as u32 + 1, total);

        let html = match session.fetch_message_html(row.upstream_id) {
            Ok(html) => html,
            Err(e) => {
                archivist_observability::log_item_skipped!("message", row.upstream_id, e);
                continue;
            }
        };

        let cleaned = extract::clean_message_html(&html);

        if Message::is_placeholder_body(&cleaned.body) {
            tracing::warn!(
                upstream_id = row.upstream_id,
                body_len = cleaned.body.chars().count(),
                "cleaned body is below the placeholder threshold, emitting anyway"
            );
        }

        messages.push(RetrievedMessage {
            upstream_id: row.upstream_id,
            posted_at: row.posted_at,
            from_display: cleaned.from.unwrap_or(row.from_display),
            from_email: row.from_email,
            listserv: row.listserv,
            subject: cleaned.subject.unwrap_or(row.subject),
            body: cleaned.body,
            has_attachment: row.has_attachment,
            position: row.position,
            page: row.page,
        });
    }

    messages
}
