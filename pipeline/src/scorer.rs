//! Scorer (spec.md §4.6): per-message relevance verdict against the REAL
//! question. Grounded on `ai_analyzer.py`'s `AIAnalyzer.analyze_relevance`
//! (prompt shape, 2000-char body truncation, strict-JSON output schema,
//! per-instance running cost total), generalized from one base prompt to a
//! prompt family keyed off query type, and reading the idempotence check
//! from the Store rather than a separate exists-query (spec.md §4.6).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use archivist_config::ReasoningConfig;
use archivist_models::search::QueryType;
use archivist_models::{Message, Verdict};
use archivist_reasoning::{ReasoningClient, UsageTotals};
use archivist_store::Store;

use crate::error::{PipelineError, Result};
use crate::retry::with_retry;

const MAX_BODY_CHARS: usize = 2_000;
const TRUNCATION_MARKER: &str = "... [truncated]";

const BASE_SYSTEM_PROMPT: &str = "You are an expert legal assistant analyzing California workers' \
compensation case law and listserv messages. Your job is to determine if a message is genuinely \
relevant to a research question. Your reasoning must reference the research question itself, never \
the raw search keywords that happened to retrieve the message.";

/// Matches the REAL question shape the planner produces for a `posted_by`
/// -only spec (spec.md §8 B1): "Find ALL messages from X; ...".
static AUTHOR_ANCHORED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^find all messages from ([^;]+);").unwrap()
});

#[derive(Debug, Deserialize)]
struct VerdictJson {
    is_relevant: bool,
    confidence: f64,
    reasoning: String,
}

impl From<VerdictJson> for Verdict {
    fn from(json: VerdictJson) -> Self {
        Verdict { is_relevant: json.is_relevant, confidence: json.confidence, reasoning: json.reasoning }
    }
}

pub struct Scorer<'a> {
    reasoning: &'a ReasoningClient,
    config: &'a ReasoningConfig,
    usage: UsageTotals,
}

impl<'a> Scorer<'a> {
    pub fn new(reasoning: &'a ReasoningClient, config: &'a ReasoningConfig) -> Self {
        Self { reasoning, config, usage: UsageTotals::default() }
    }

    /// The Scorer's running (tokens, cost) total across every call this
    /// instance has made (spec.md §4.6 "Cost accounting").
    pub fn usage(&self) -> UsageTotals {
        self.usage
    }

    /// Score one message against `real_question`, persisting the verdict.
    /// Returns `Ok(None)` without calling the reasoning service if an
    /// Analysis already exists for this (search, message) pair (spec.md
    /// §4.6 "Idempotence").
    pub async fn score(
        &mut self,
        store: &Store,
        search_id: Uuid,
        query_type: QueryType,
        real_question: &str,
        message: &Message,
    ) -> Result<Option<Verdict>> {
        if store.analysis_exists(search_id, message.id).await.map_err(PipelineError::Store)? {
            return Ok(None);
        }

        let (system, user) = build_prompt(query_type, real_question, message);

        let (verdict, model_id, tokens_used, cost) = match self
            .reasoning
            .complete_json(Some(&self.config.scorer_model), &system, &user, self.config.scorer_max_tokens)
            .await
        {
            Ok(response) => {
                let verdict = archivist_reasoning::extract_json::<VerdictJson>(&response.content)
                    .map(Verdict::from)
                    .unwrap_or_else(Verdict::parse_failure);
                self.usage.record(&response.model, response.total_tokens());
                let cost = archivist_reasoning::estimate_cost(&response.model, response.total_tokens());
                (verdict, response.model, response.total_tokens() as i32, cost)
            }
            Err(e) => {
                // ReasoningUnavailable (spec.md §7): default verdict, but the
                // search still proceeds to completion.
                tracing::warn!(error = %e, message_id = %message.id, "scorer reasoning call failed, defaulting to not relevant");
                (Verdict::parse_failure(), self.config.scorer_model.clone(), 0, 0.0)
            }
        };

        with_retry("upsert_analysis", || {
            store.upsert_analysis(search_id, message.id, verdict.clone(), &model_id, tokens_used, cost)
        })
        .await?;

        Ok(Some(verdict))
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    format!("{truncated}{TRUNCATION_MARKER}")
}

fn mode_framing(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::General => "Determine whether this message is relevant to the research question below.",
        QueryType::DoctorEval => {
            "Determine whether this message provides information useful for evaluating the named doctor."
        }
        QueryType::JudgeEval => {
            "Determine whether this message provides information useful for evaluating the named judge."
        }
        QueryType::AdjusterEval => {
            "Determine whether this message provides information useful for evaluating the named adjuster."
        }
        QueryType::DefenseAttorneyEval => {
            "Determine whether this message provides information useful for evaluating the named defense attorney."
        }
        QueryType::InsuranceCompanyEval => {
            "Determine whether this message provides information useful for evaluating the named insurance company."
        }
        QueryType::AmeQmeSearch => {
            "Determine whether this message discusses or recommends an AME/QME medical-legal examiner relevant to the request."
        }
    }
}

fn build_prompt(query_type: QueryType, real_question: &str, message: &Message) -> (String, String) {
    let body = truncate_body(&message.body);
    let framing = mode_framing(query_type);

    let anchor_clause = if query_type == QueryType::General {
        AUTHOR_ANCHORED.captures(real_question).map(|caps| {
            let who = caps.get(1).map(|m| m.as_str()).unwrap_or("").trim().to_string();
            format!(
                "\nSPECIAL CASE: the research question is author-anchored on \"{who}\". Any message \
                 sent FROM {who} is relevant at confidence 0.95 regardless of content; any message \
                 that clearly mentions {who} is relevant at confidence 0.85. Apply this rule before \
                 considering content quality.\n"
            )
        })
    } else {
        None
    };

    let user = format!(
        r#"{framing}

RESEARCH QUESTION: "{real_question}"
{anchor}
MESSAGE:
From: {from}
Subject: {subject}
Body: {body}

Your task:
1. Determine if this message is genuinely relevant to the research question above.
2. Consider whether it directly and substantively discusses the question, not just a brief mention.
3. Provide a confidence score (0.0 to 1.0).
4. Explain your reasoning briefly, referencing the research question, never the search keywords.

Respond in JSON format:
{{
  "is_relevant": true/false,
  "confidence": 0.0-1.0,
  "reasoning": "Brief explanation (1-2 sentences)"
}}
"#,
        framing = framing,
        real_question = real_question,
        anchor = anchor_clause.unwrap_or_default(),
        from = message.from_display,
        subject = message.subject,
        body = body,
    );

    (BASE_SYSTEM_PROMPT.to_string(), user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_message(body: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            upstream_id: 1,
            posted_at: Utc::now(),
            from_display: "Chris Johnson".to_string(),
            from_email: None,
            listserv: "lawnet".to_string(),
            subject: "SIBTF question".to_string(),
            body: body.to_string(),
            has_attachment: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn truncates_long_bodies_with_the_marker() {
        let body = "x".repeat(MAX_BODY_CHARS + 500);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with(TRUNCATION_MARKER));
        assert_eq!(truncated.chars().count(), MAX_BODY_CHARS + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn short_bodies_are_untouched() {
        assert_eq!(truncate_body("hello"), "hello");
    }

    #[test]
    fn author_anchored_general_question_adds_the_special_case_clause() {
        let message = sample_message("some unrelated content");
        let (_, user) =
            build_prompt(QueryType::General, "Find ALL messages from Chris Johnson; any message from this person is relevant regardless of content", &message);
        assert!(user.contains("SPECIAL CASE"));
        assert!(user.contains("0.95"));
    }

    #[test]
    fn non_author_anchored_general_question_has_no_special_case_clause() {
        let message = sample_message("some content");
        let (_, user) = build_prompt(QueryType::General, "recent discussions about SIBTF", &message);
        assert!(!user.contains("SPECIAL CASE"));
    }

    #[test]
    fn evaluation_modes_never_add_the_author_anchor_clause() {
        let message = sample_message("some content");
        let (_, user) = build_prompt(
            QueryType::JudgeEval,
            "Find ALL messages from Dobrin; irrelevant match",
            &message,
        );
        assert!(!user.contains("SPECIAL CASE"));
    }
}
