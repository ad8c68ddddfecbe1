//! Synthesizer (spec.md §4.7): the per-search aggregate verdict for
//! evaluation-mode searches. No direct Python original (the original system
//! never aggregated across messages), so the prompt is authored fresh,
//! following the same system/user-prompt shape `ai_analyzer.py` establishes
//! for the Scorer, applied to a list instead of one message.

use serde::Deserialize;
use uuid::Uuid;

use archivist_config::ReasoningConfig;
use archivist_models::search::QueryType;
use archivist_models::{AmeQmeRecommendation, EvaluationLabel, SynthesisResult};
use archivist_reasoning::ReasoningClient;
use archivist_store::RelevantResult;

use crate::planner::subject_for;

/// Below this many relevant messages, the Synthesizer is bypassed entirely
/// (spec.md §4.7 "Insufficient-data rule", §8 B3).
pub const MIN_RELEVANT_FOR_SYNTHESIS: usize = 3;

const MAX_RELEVANT_MESSAGES: usize = 50;
const MAX_BODY_CHARS: usize = 1_000;

const SYSTEM_PROMPT: &str = "You are an expert legal assistant summarizing California workers' \
compensation listserv discussions into a single evaluation. Base your verdict only on the messages \
provided; do not invent facts not present in them.";

#[derive(Debug, Deserialize)]
struct ScalarVerdictJson {
    score: i32,
    evaluation: String,
    reasoning: String,
}

/// Produce the per-search synthesis for one evaluation-mode search. Callers
/// must have already checked `relevant.len() >= MIN_RELEVANT_FOR_SYNTHESIS`
/// (spec.md §4.7); this function does not re-check it, so the Orchestrator's
/// bypass to `SynthesisResult::insufficient_data` stays a single code path.
pub async fn synthesize(
    search_id: Uuid,
    query_type: QueryType,
    real_question: &str,
    relevant: &[RelevantResult],
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> SynthesisResult {
    let subject = subject_for(query_type, real_question);
    let capped = &relevant[..relevant.len().min(MAX_RELEVANT_MESSAGES)];

    if query_type == QueryType::AmeQmeSearch {
        return synthesize_ame_qme(search_id, &subject, capped, reasoning, config).await;
    }

    synthesize_scalar(search_id, query_type, &subject, capped, reasoning, config).await
}

fn render_messages(relevant: &[RelevantResult]) -> String {
    relevant
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let body: String = r.message.body.chars().take(MAX_BODY_CHARS).collect();
            format!(
                "[{n}] From: {from}\nSubject: {subject}\nBody: {body}\n",
                n = i + 1,
                from = r.message.from_display,
                subject = r.message.subject,
                body = body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn synthesize_scalar(
    search_id: Uuid,
    query_type: QueryType,
    subject: &str,
    relevant: &[RelevantResult],
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> SynthesisResult {
    let allowed_labels = match query_type {
        QueryType::DefenseAttorneyEval => "easy_to_deal_with, moderate, difficult_to_deal_with",
        _ => "good, mixed, bad",
    };

    let prompt = format!(
        r#"SUBJECT BEING EVALUATED: "{subject}"

Below are {count} relevant messages discussing this subject, drawn from a legal listserv archive.

{messages}

Your task: synthesize one overall evaluation of the subject from these messages.
- score: an integer from 0 to 100.
- evaluation: one of {{{labels}}}.
- reasoning: a brief explanation grounded in the messages above.

Respond in JSON format:
{{
  "score": 0-100,
  "evaluation": "one of {{{labels}}}",
  "reasoning": "string"
}}
"#,
        subject = subject,
        count = relevant.len(),
        messages = render_messages(relevant),
        labels = allowed_labels,
    );

    let parsed = reasoning
        .complete_json(Some(&config.synthesis_model), SYSTEM_PROMPT, &prompt, config.synthesis_max_tokens)
        .await
        .ok()
        .and_then(|response| archivist_reasoning::extract_json::<ScalarVerdictJson>(&response.content));

    match parsed {
        Some(json) => {
            let evaluation = EvaluationLabel::from_str_loose(&json.evaluation)
                .unwrap_or(EvaluationLabel::Mixed)
                .normalize_for_mode(query_type);
            SynthesisResult::new(search_id, json.score, evaluation, json.reasoning)
        }
        None => SynthesisResult::new(
            search_id,
            0,
            EvaluationLabel::Error.normalize_for_mode(query_type),
            "Failed to synthesize an evaluation from the reasoning service's reply.".to_string(),
        ),
    }
}

async fn synthesize_ame_qme(
    search_id: Uuid,
    subject: &str,
    relevant: &[RelevantResult],
    reasoning: &ReasoningClient,
    config: &ReasoningConfig,
) -> SynthesisResult {
    let prompt = format!(
        r#"SPECIALTY / CONTEXT REQUESTED: "{subject}"

Below are {count} relevant messages discussing AME/QME medical-legal examiners, drawn from a legal
listserv archive.

{messages}

Your task: produce a ranked recommendation list of the doctors mentioned, based only on what these
messages say about them.

Respond in JSON format:
{{
  "doctors": [
    {{
      "name": "string",
      "positive_mentions": 0,
      "negative_mentions": 0,
      "net_score": 0,
      "sample_quotes": ["string"],
      "warnings": ["string"]
    }}
  ],
  "total_mentions": 0,
  "reasoning": "string"
}}
"#,
        subject = subject,
        count = relevant.len(),
        messages = render_messages(relevant),
    );

    let parsed = reasoning
        .complete_json(Some(&config.synthesis_model), SYSTEM_PROMPT, &prompt, config.synthesis_max_tokens)
        .await
        .ok()
        .and_then(|response| archivist_reasoning::extract_json::<AmeQmeRecommendation>(&response.content));

    match parsed {
        Some(recommendation) => recommendation.sorted().into_synthesis_result(search_id),
        None => SynthesisResult::new(
            search_id,
            0,
            EvaluationLabel::Error,
            "Failed to synthesize an AME/QME recommendation from the reasoning service's reply."
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivist_models::{Analysis, Message, Verdict};
    use chrono::Utc;

    fn sample_relevant(body: &str) -> RelevantResult {
        let message_id = Uuid::new_v4();
        RelevantResult {
            message: Message {
                id: message_id,
                upstream_id: 1,
                posted_at: Utc::now(),
                from_display: "Jane Roe".to_string(),
                from_email: None,
                listserv: "lavaaa".to_string(),
                subject: "RE: negotiation".to_string(),
                body: body.to_string(),
                has_attachment: false,
                created_at: Utc::now(),
            },
            analysis: Analysis::from_verdict(
                Uuid::new_v4(),
                Uuid::new_v4(),
                message_id,
                Verdict { is_relevant: true, confidence: 0.9, reasoning: "x".to_string() },
                "gpt-4o-mini".to_string(),
                100,
                0.0001,
                Utc::now(),
            ),
            position: 1,
            page: 1,
        }
    }

    #[test]
    fn render_messages_numbers_each_entry() {
        let entries = vec![sample_relevant("first"), sample_relevant("second")];
        let rendered = render_messages(&entries);
        assert!(rendered.contains("[1]"));
        assert!(rendered.contains("[2]"));
    }

    #[test]
    fn render_messages_truncates_long_bodies() {
        let long_body = "x".repeat(MAX_BODY_CHARS + 200);
        let rendered = render_messages(&[sample_relevant(&long_body)]);
        assert!(rendered.lines().any(|l| l.starts_with("Body: ") && l.len() < long_body.len()));
    }
}
