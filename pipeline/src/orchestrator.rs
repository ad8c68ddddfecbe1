//! The Orchestrator (spec.md §4.8): the per-search worker's state machine,
//! owning the lifetime of one Retriever attachment. Grounded on
//! `orchestrator.py`'s `CAAAOrchestrator.search` for the step sequence
//! (plan → retrieve → store → score → synthesize → complete) and its
//! `_progress_callback`/`_analyze_relevance` shape, reworked into Rust's
//! typed-error-plus-state-machine idiom instead of print statements and a
//! raw `Dict` return value.

use std::sync::Arc;

use uuid::Uuid;

use archivist_config::ReasoningConfig;
use archivist_models::search::QueryType;
use archivist_models::{SearchStatus, SynthesisResult};
use archivist_reasoning::{ReasoningClient, UsageTotals};
use archivist_retriever::{ProgressSink, Retriever};
use archivist_store::{NewMessage, Store};

use crate::error::{PipelineError, Result};
use crate::retry::with_retry;
use crate::scorer::Scorer;
use crate::synthesizer::{self, MIN_RELEVANT_FOR_SYNTHESIS};

/// Reports retrieval progress by writing through to the Store's status
/// counters (spec.md §4.8 "Progress reporting"), generalizing `scraper.py`'s
/// `progress_callback(status, current, total)`.
///
/// `report` is called synchronously from the Retriever's dedicated
/// `spawn_blocking` thread (`archivist_retriever::Retriever::retrieve`), not
/// from an async task, so blocking that thread on the write is safe and,
/// critically, keeps every progress write strictly ordered and finished
/// before `retrieve()` returns to the Orchestrator — none can land after the
/// authoritative `messages_found` write in `run_inner`, or after the later
/// `Completed` transition, and clobber it: `analyzed` must never exceed
/// `messages_found`.
struct StoreProgressSink {
    store: Store,
    search_id: Uuid,
}

impl ProgressSink for StoreProgressSink {
    fn report(&self, status: &str, current: u32, total: u32) {
        tracing::info!(search_id = %self.search_id, status, current, total, "retrieval progress");
        let messages_found = current as i32;
        let result = tokio::runtime::Handle::current().block_on(self.store.set_search_status(
            self.search_id,
            SearchStatus::Running,
            Some(messages_found),
            None,
            None,
        ));
        if let Err(e) = result {
            tracing::warn!(search_id = %self.search_id, error = %e, "failed to persist retrieval progress");
        }
    }
}

/// Outcome of one complete search run, for callers that want it without a
/// second Store round-trip (the worker binary logs this and exits).
pub struct SearchOutcome {
    pub search_id: Uuid,
    pub messages_found: i32,
    pub relevant: i32,
    pub synthesis: Option<SynthesisResult>,
    pub usage: UsageTotals,
}

pub struct Orchestrator {
    store: Store,
    reasoning: ReasoningClient,
    reasoning_config: ReasoningConfig,
    retriever: Retriever,
}

impl Orchestrator {
    pub fn new(
        store: Store,
        reasoning: ReasoningClient,
        reasoning_config: ReasoningConfig,
        retriever: Retriever,
    ) -> Self {
        Self { store, reasoning, reasoning_config, retriever }
    }

    /// Run `search_id` to completion. Expects `real_question` to already be
    /// resolved: the Clarifier gates a search before a worker is ever
    /// spawned (spec.md §4.3), so it plays no further part here.
    pub async fn run(
        &self,
        search_id: Uuid,
        real_question: &str,
        query_type: QueryType,
    ) -> Result<SearchOutcome> {
        let search = self.store.get_search(search_id).await.map_err(PipelineError::Store)?;

        with_retry("set_search_status:running", || {
            self.store.set_search_status(search_id, SearchStatus::Running, None, None, None)
        })
        .await?;

        match self.run_inner(search_id, real_question, query_type, &search.spec).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(search_id = %search_id, error = %e, "search failed, marking terminal");
                // Best-effort: a failure writing the failed status itself is
                // logged but doesn't mask the original error.
                if let Err(mark_err) = with_retry("set_search_status:failed", || {
                    self.store.set_search_status(search_id, SearchStatus::Failed, None, None, None)
                })
                .await
                {
                    tracing::error!(search_id = %search_id, error = %mark_err, "failed to mark search as failed");
                }
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        search_id: Uuid,
        real_question: &str,
        query_type: QueryType,
        existing_spec: &archivist_models::SearchSpec,
    ) -> Result<SearchOutcome> {
        // The spec was already planned at search-creation time; re-planning
        // here would silently diverge from what the user was shown. The
        // Orchestrator reloads it from the Store as the authoritative source
        // (spec.md §4.8 "Isolation") rather than calling the planner again.
        let spec = existing_spec.clone();

        let progress: Arc<dyn ProgressSink> =
            Arc::new(StoreProgressSink { store: self.store.clone(), search_id });

        let retrieved = self.retriever.retrieve(spec, progress).await.map_err(PipelineError::Retrieval)?;

        let mut messages_found = 0i32;
        for item in &retrieved {
            let message_id = with_retry("upsert_message", || {
                self.store.upsert_message(NewMessage {
                    upstream_id: item.upstream_id,
                    posted_at: item.posted_at,
                    from_display: item.from_display.clone(),
                    from_email: item.from_email.clone(),
                    listserv: item.listserv.clone(),
                    subject: item.subject.clone(),
                    body: item.body.clone(),
                    has_attachment: item.has_attachment,
                })
            })
            .await?;

            with_retry("link_result", || {
                self.store.link_result(search_id, message_id, item.position as i32, item.page as i32)
            })
            .await?;

            messages_found += 1;
        }

        // Authoritative count: runs after every progress write `retrieve()`
        // triggered has already completed (see `StoreProgressSink::report`),
        // so this is always the last word on `messages_found` until scoring.
        with_retry("set_search_status:messages_found", || {
            self.store.set_search_status(search_id, SearchStatus::Running, Some(messages_found), None, None)
        })
        .await?;

        let linked = self.store.linked_messages(search_id).await.map_err(PipelineError::Store)?;

        // Sequential, per spec.md §5: no intra-search parallelism.
        let mut scorer = Scorer::new(&self.reasoning, &self.reasoning_config);
        for linked_message in &linked {
            scorer
                .score(&self.store, search_id, query_type, real_question, &linked_message.message)
                .await?;
        }
        let analyzed = linked.len() as i32;

        let relevant_results = self.store.relevant_results(search_id).await.map_err(PipelineError::Store)?;
        let relevant = relevant_results.len() as i32;

        with_retry("set_search_status:analyzed", || {
            self.store.set_search_status(search_id, SearchStatus::Running, None, Some(analyzed), Some(relevant))
        })
        .await?;

        let synthesis = if query_type.is_evaluation_mode() {
            let result = if relevant_results.len() < MIN_RELEVANT_FOR_SYNTHESIS {
                SynthesisResult::insufficient_data(
                    search_id,
                    format!(
                        "Only {} relevant message(s) found; at least {} are required to synthesize an evaluation.",
                        relevant_results.len(),
                        MIN_RELEVANT_FOR_SYNTHESIS
                    ),
                )
            } else {
                synthesizer::synthesize(
                    search_id,
                    query_type,
                    real_question,
                    &relevant_results,
                    &self.reasoning,
                    &self.reasoning_config,
                )
                .await
            };

            with_retry("save_synthesis", || self.store.save_synthesis(&result)).await?;
            Some(result)
        } else {
            None
        };

        with_retry("set_search_status:completed", || {
            self.store.set_search_status(search_id, SearchStatus::Completed, None, None, None)
        })
        .await?;

        let usage = scorer.usage();
        tracing::info!(
            search_id = %search_id,
            total_tokens = usage.total_tokens,
            total_cost_usd = usage.total_cost_usd,
            "search complete"
        );

        Ok(SearchOutcome { search_id, messages_found, relevant, synthesis, usage })
    }
}
