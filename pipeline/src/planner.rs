//! QueryPlanner (spec.md §4.4): turns a `(query_type, real_question)` pair
//! into a `SearchSpec`. General mode is LLM-driven, grounded on
//! `query_enhancer.py`'s `_build_enhancement_prompt`/`_create_search_params`
//! (generalized from the Python `SearchParams` dataclass's smaller field set
//! to the full `SearchSpec` catalog). The five evaluation-mode variants are
//! hand-built per spec.md §4.4, since reproducibility of known name variants
//! matters more than LLM generality for a named subject.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use archivist_config::ReasoningConfig;
use archivist_models::search::QueryType;
use archivist_models::spec::{canonicalize_terms, Listserv, SearchIn};
use archivist_models::SearchSpec;
use archivist_reasoning::ReasoningClient;

const GENERAL_SYSTEM_PROMPT: &str = "You are an expert at California workers' compensation law and legal \
research. Your job is to translate a plain-English research question into optimized search parameters \
for a legal listserv archive.";

/// Run the planner for `query_type` against `real_question`. Never fails:
/// any planning attempt that errors or produces unparseable output falls
/// back to `simple = real_question` (spec.md §4.4 "Fallback").
pub async fn plan(
    query_type: QueryType,
    real_question: &str,
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> SearchSpec {
    let planned = match query_type {
        QueryType::General => general_llm_plan(real_question, None, reasoning, config).await,
        QueryType::DoctorEval => {
            let subject = strip_question_prefix(real_question, &["evaluate doctor:"]);
            let preamble = format!("Find all messages mentioning the doctor {subject}.");
            general_llm_plan(real_question, Some(&preamble), reasoning, config).await
        }
        QueryType::AdjusterEval => {
            let subject = strip_question_prefix(real_question, &["evaluate adjuster:"]);
            let preamble = format!("Find all messages mentioning the adjuster {subject}.");
            general_llm_plan(real_question, Some(&preamble), reasoning, config).await
        }
        QueryType::AmeQmeSearch => {
            let subject = strip_question_prefix(
                real_question,
                &["find best ame:", "find best qme:", "find best ame|qme:", "find best both:"],
            );
            let preamble = format!(
                "Find messages that recommend or discuss AME/QME medical-legal examiners, for the \
                 specialty or context: {subject}."
            );
            general_llm_plan(real_question, Some(&preamble), reasoning, config).await
        }
        QueryType::JudgeEval => Some(judge_eval_spec(real_question)),
        QueryType::DefenseAttorneyEval => Some(defense_attorney_spec(real_question)),
        QueryType::InsuranceCompanyEval => {
            Some(insurance_company_spec(real_question, reasoning, config).await)
        }
    };

    planned.unwrap_or_else(|| fallback_spec(real_question))
}

fn fallback_spec(real_question: &str) -> SearchSpec {
    SearchSpec { simple: Some(real_question.to_string()), ..SearchSpec::new() }
}

/// Strip a known "Evaluate X:" / "Find best X:" prefix (case-insensitively)
/// to recover the bare subject; if no known prefix matches, the whole
/// question is treated as the subject.
fn strip_question_prefix(question: &str, prefixes: &[&str]) -> String {
    let lower = question.to_ascii_lowercase();
    for prefix in prefixes {
        if lower.starts_with(prefix) {
            return question[prefix.len()..].trim().to_string();
        }
    }
    question.trim().to_string()
}

// ---- General mode (LLM-driven) ----

#[derive(Debug, Deserialize, Default)]
struct PlannerJson {
    keywords_all: Option<String>,
    keywords_phrase: Option<String>,
    keywords_any: Option<String>,
    keywords_exclude: Option<String>,
    simple: Option<String>,
    posted_by: Option<String>,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
    listserv: Option<String>,
    search_in: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
}

async fn general_llm_plan(
    real_question: &str,
    preamble: Option<&str>,
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> Option<SearchSpec> {
    let prompt = build_general_prompt(real_question, preamble);

    let response = reasoning
        .complete_json(Some(&config.planner_model), GENERAL_SYSTEM_PROMPT, &prompt, config.planner_max_tokens)
        .await
        .ok()?;

    let parsed: PlannerJson = archivist_reasoning::extract_json(&response.content)?;
    Some(apply_temporal_fallback(real_question, from_planner_json(parsed)))
}

fn build_general_prompt(real_question: &str, preamble: Option<&str>) -> String {
    let preamble_line = preamble.map(|p| format!("CONTEXT: {p}\n")).unwrap_or_default();

    format!(
        r#"REAL QUESTION: "{real_question}"
{preamble_line}
Your task: determine the BEST search parameters on the archive to answer the real question.

Available SearchSpec fields:
- keywords_all: every term must appear (comma-separated when more than one)
- keywords_phrase: exact phrase match; only set this if the real question asks for an exact phrase
- keywords_any: at least one term must appear (comma-separated when more than one)
- keywords_exclude: none of these terms may appear
- simple: a single basic keyword or phrase, when nothing more structured applies
- posted_by: sender display name, when the real question is about who POSTED a message
- author_first_name / author_last_name: an expert or witness named IN a message's content, not its sender
- listserv: "all", "lawnet" (applicant/worker's side), "lavaaa" (defense/employer side), "lamaaa", "scaaa"
- search_in: "subject_and_body" or "subject_only"
- date_from / date_to: "YYYY-MM-DD" or null

Guidelines:
- Prefer keywords_any (broad) over keywords_all (narrow); use keywords_all only when multiple
  concepts must co-occur.
- Never set keywords_phrase unless the real question explicitly asks for an exact phrase.
- Temporal cues ("recent", "latest", "new") should set date_from to roughly six months before today
  and leave date_to null.
- Disambiguate a person's name: posted_by for the sender, author_first_name/author_last_name for an
  expert or witness discussed in the content. Default to broader content keywords when ambiguous.
- Topics the real question explicitly excludes go in keywords_exclude.
- Side cues ("applicant", "worker's side") select listserv=lawnet; ("defense", "employer side")
  select listserv=lavaaa.
- Multi-term fields are always comma-separated, never space-delimited or a JSON array.

Respond in JSON format:
{{
  "keywords_all": "string or null",
  "keywords_phrase": "string or null",
  "keywords_any": "string or null",
  "keywords_exclude": "string or null",
  "simple": "string or null",
  "posted_by": "string or null",
  "author_first_name": "string or null",
  "author_last_name": "string or null",
  "listserv": "all/lawnet/lavaaa/lamaaa/scaaa",
  "search_in": "subject_and_body or subject_only",
  "date_from": "YYYY-MM-DD or null",
  "date_to": "YYYY-MM-DD or null"
}}
"#
    )
}

fn from_planner_json(json: PlannerJson) -> SearchSpec {
    let mut spec = SearchSpec::new();

    spec.keywords_all = normalize_multi_term(json.keywords_all);
    spec.keywords_any = normalize_multi_term(json.keywords_any);
    spec.keywords_exclude = normalize_multi_term(json.keywords_exclude);
    spec.keywords_phrase = non_empty(json.keywords_phrase);
    spec.simple = non_empty(json.simple);
    spec.posted_by = non_empty(json.posted_by);
    spec.author_first_name = non_empty(json.author_first_name);
    spec.author_last_name = non_empty(json.author_last_name);

    spec.listserv = json.listserv.as_deref().and_then(Listserv::from_str_loose).unwrap_or_default();
    spec.search_in = match json.search_in.as_deref() {
        Some("subject_only") => SearchIn::SubjectOnly,
        _ => SearchIn::SubjectAndBody,
    };

    spec.date_from = json.date_from.as_deref().and_then(parse_iso_date);
    spec.date_to = json.date_to.as_deref().and_then(parse_iso_date);

    spec
}

/// Normalizes a multi-term field to the comma-joined canonical form (spec.md
/// §4.4: "if the model returns a space-delimited string or an array, the
/// planner normalizes it" — the model always emits a string, so the array
/// case is handled upstream by `canonicalize_terms`' whitespace fallback).
fn normalize_multi_term(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let terms = canonicalize_terms(&raw);
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(", "))
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_iso_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

const TEMPORAL_CUES: &[&str] = &["recent", "latest", "new"];

/// Deterministic safety net for spec.md §8 B2: guarantees `date_from` is set
/// for a temporally-cued question even if the model omits it.
fn apply_temporal_fallback(real_question: &str, mut spec: SearchSpec) -> SearchSpec {
    if spec.date_from.is_none() {
        let lower = real_question.to_ascii_lowercase();
        if TEMPORAL_CUES.iter().any(|cue| lower.contains(cue)) {
            spec.date_from = Some((chrono::Utc::now() - chrono::Duration::days(180)).date_naive());
        }
    }
    spec
}

/// The bare subject a REAL question names (the doctor/judge/adjuster/etc.),
/// for the modes that name one. Shared by the Synthesizer's prompt-building.
pub(crate) fn subject_for(query_type: QueryType, real_question: &str) -> String {
    match query_type {
        QueryType::DoctorEval => strip_question_prefix(real_question, &["evaluate doctor:"]),
        QueryType::JudgeEval => strip_question_prefix(real_question, &["evaluate judge:"]),
        QueryType::AdjusterEval => strip_question_prefix(real_question, &["evaluate adjuster:"]),
        QueryType::DefenseAttorneyEval => {
            strip_question_prefix(real_question, &["evaluate defense attorney:"])
        }
        QueryType::InsuranceCompanyEval => {
            strip_question_prefix(real_question, &["evaluate insurance company:"])
        }
        QueryType::AmeQmeSearch => strip_question_prefix(
            real_question,
            &["find best ame:", "find best qme:", "find best ame|qme:", "find best both:"],
        ),
        QueryType::General => real_question.to_string(),
    }
}

// ---- Deterministic evaluation-mode variants ----

static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(workers'?\s+compensation\s+judge|honorable|judge|hon\.?|wcj)\s+").unwrap()
});

fn strip_title_prefix(name: &str) -> String {
    TITLE_PREFIX.replace(name, "").trim().to_string()
}

/// Title-prefixed and bare name variants, in the fixed order spec.md §4.4
/// and its example 3 use.
fn name_variants(name: &str) -> Vec<String> {
    vec![
        format!("Judge {name}"),
        name.to_string(),
        format!("Hon. {name}"),
        format!("Hon {name}"),
        format!("WCJ {name}"),
        format!("Honorable {name}"),
        format!("{name} WCJ"),
    ]
}

fn judge_eval_spec(real_question: &str) -> SearchSpec {
    let subject = strip_question_prefix(real_question, &["evaluate judge:"]);
    let bare = strip_title_prefix(&subject);
    let last_name = bare.split_whitespace().last().unwrap_or(&bare).to_string();

    let mut variants = Vec::new();
    if bare.split_whitespace().count() > 1 {
        variants.extend(name_variants(&bare));
    }
    variants.extend(name_variants(&last_name));

    let mut seen = HashSet::new();
    variants.retain(|v| seen.insert(v.clone()));

    SearchSpec { keywords_any: Some(variants.join(", ")), ..SearchSpec::new() }
}

fn defense_attorney_spec(real_question: &str) -> SearchSpec {
    let subject = strip_question_prefix(real_question, &["evaluate defense attorney:"]);
    let last_name = subject.split_whitespace().last().unwrap_or(&subject).to_string();

    SearchSpec {
        keywords_all: Some(last_name),
        keywords_any: Some(
            "defense, defendant, opposing, counsel, attorney, negotiate, settlement, deposition, lien"
                .to_string(),
        ),
        ..SearchSpec::new()
    }
}

#[derive(Debug, Deserialize)]
struct AbbreviationJson {
    abbreviation: String,
}

async fn insurance_company_spec(
    real_question: &str,
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> SearchSpec {
    let subject = strip_question_prefix(real_question, &["evaluate insurance company:"]);
    let abbreviation = lookup_abbreviation(&subject, reasoning, config)
        .await
        .unwrap_or_else(|| subject.split_whitespace().next().unwrap_or(&subject).to_string());

    SearchSpec {
        keywords_all: Some(abbreviation),
        keywords_any: Some(
            "insurance, carrier, insurer, claim, adjuster, authorization, denial, coverage, settlement, premium"
                .to_string(),
        ),
        ..SearchSpec::new()
    }
}

async fn lookup_abbreviation(
    carrier: &str,
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> Option<String> {
    let system = "You are an expert at California workers' compensation insurance carriers.";
    let user = format!(
        "What is the most common colloquial abbreviation workers' comp practitioners use for the \
         insurance carrier \"{carrier}\"? Respond in JSON format: {{\"abbreviation\": \"string\"}}"
    );

    let response = reasoning
        .complete_json(Some(&config.planner_model), system, &user, config.planner_max_tokens)
        .await
        .ok()?;

    let parsed: AbbreviationJson = archivist_reasoning::extract_json(&response.content)?;
    let trimmed = parsed.abbreviation.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_eval_matches_the_spec_example() {
        let spec = judge_eval_spec("Evaluate judge: Judge Dobrin");
        assert_eq!(
            spec.keywords_any,
            Some(
                "Judge Dobrin, Dobrin, Hon. Dobrin, Hon Dobrin, WCJ Dobrin, Honorable Dobrin, Dobrin WCJ"
                    .to_string()
            )
        );
        assert!(spec.keywords_all.is_none());
    }

    #[test]
    fn judge_eval_with_full_name_unions_full_and_last_name_variants() {
        let spec = judge_eval_spec("Evaluate judge: Honorable Jane Dobrin");
        let any = spec.keywords_any.unwrap();
        assert!(any.contains("Jane Dobrin"));
        assert!(any.contains("Judge Dobrin"));
    }

    #[test]
    fn defense_attorney_matches_the_spec_example() {
        let spec = defense_attorney_spec("Evaluate defense attorney: Jane Roe");
        assert_eq!(spec.keywords_all, Some("Roe".to_string()));
        assert!(spec.keywords_any.unwrap().contains("deposition"));
    }

    #[test]
    fn fallback_spec_uses_the_real_question_as_simple() {
        let spec = fallback_spec("recent discussions about SIBTF");
        assert_eq!(spec.simple, Some("recent discussions about SIBTF".to_string()));
    }

    #[test]
    fn temporal_fallback_sets_date_from_for_recent() {
        let spec = apply_temporal_fallback("recent discussions about SIBTF", SearchSpec::new());
        assert!(spec.date_from.is_some());
    }

    #[test]
    fn temporal_fallback_leaves_non_temporal_questions_alone() {
        let spec = apply_temporal_fallback("discussions about SIBTF", SearchSpec::new());
        assert!(spec.date_from.is_none());
    }

    #[test]
    fn normalize_multi_term_canonicalizes_space_delimited_input() {
        assert_eq!(normalize_multi_term(Some("a b c".to_string())), Some("a, b, c".to_string()));
    }

    #[test]
    fn strip_question_prefix_is_case_insensitive() {
        assert_eq!(strip_question_prefix("EVALUATE JUDGE: Dobrin", &["evaluate judge:"]), "Dobrin");
    }
}
