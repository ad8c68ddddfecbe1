//! `search-worker`: runs exactly one search to completion, then exits
//! (spec.md §4.8 "Isolation" — one worker process per search). Invoked with
//! the argument tuple spec.md §6 names: `(search_id, real_question,
//! query_type)`. The SearchSpec itself is not an argument; the worker
//! reloads it from the Store as the authoritative source.

use anyhow::{Context, Result};
use uuid::Uuid;

use archivist_config::AppConfig;
use archivist_models::search::QueryType;
use archivist_observability::{init_tracing, TracingConfig};
use archivist_pipeline::Orchestrator;
use archivist_reasoning::ReasoningClient;
use archivist_retriever::Retriever;
use archivist_store::Store;

struct Args {
    search_id: Uuid,
    real_question: String,
    query_type: QueryType,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);

    let search_id = args
        .next()
        .context("usage: search-worker <search_id> <real_question> <query_type>")?
        .parse::<Uuid>()
        .context("search_id must be a UUID")?;

    let real_question = args.next().context("missing real_question argument")?;

    let query_type_raw = args.next().context("missing query_type argument")?;
    let query_type = QueryType::from_str_loose(&query_type_raw)
        .with_context(|| format!("unrecognized query_type: {query_type_raw}"))?;

    Ok(Args { search_id, real_question, query_type })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(TracingConfig::for_service("search-worker"));

    let args = parse_args()?;
    let config = AppConfig::from_env();

    let store = Store::connect(&config.store).await.context("connecting to the store")?;
    let reasoning = ReasoningClient::new(&config.reasoning);
    let retriever = Retriever::new(config.retriever.clone());

    let orchestrator = Orchestrator::new(store, reasoning, config.reasoning.clone(), retriever);

    let outcome = orchestrator
        .run(args.search_id, &args.real_question, args.query_type)
        .await
        .with_context(|| format!("search {} failed", args.search_id))?;

    tracing::info!(
        search_id = %outcome.search_id,
        messages_found = outcome.messages_found,
        relevant = outcome.relevant,
        synthesized = outcome.synthesis.is_some(),
        total_tokens = outcome.usage.total_tokens,
        total_cost_usd = outcome.usage.total_cost_usd,
        "search-worker finished"
    );

    Ok(())
}
