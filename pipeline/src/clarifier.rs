//! The Clarifier (spec.md §4.3): one decision — is the user's intent
//! specific enough for the QueryPlanner, or does it admit substantively
//! different SearchSpecs? Grounded on `archivist_reasoning::ReasoningClient`
//! (the same completion-call shape the Planner and Scorer use) with a
//! prompt authored fresh, since the Python original has no equivalent
//! component — vagueness detection was folded into ad hoc prompt text
//! elsewhere in the original.

use archivist_config::ReasoningConfig;
use archivist_reasoning::ReasoningClient;

const SYSTEM_PROMPT: &str = "You are an expert at California workers' compensation law and legal research. \
You decide whether a user's search intent is specific enough to build one search, or whether it would \
produce substantively different searches depending on an unstated choice.";

/// One of `{specific}` or `{vague, follow_up_question}` (spec.md §4.3). Never
/// produces a SearchSpec itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ClarifierDecision {
    Specific,
    Vague { follow_up_question: String },
}

#[derive(Debug, serde::Deserialize)]
struct ClarifierJson {
    vague: bool,
    follow_up_question: Option<String>,
}

pub struct Clarifier<'a> {
    reasoning: &'a ReasoningClient,
    config: &'a ReasoningConfig,
}

impl<'a> Clarifier<'a> {
    pub fn new(reasoning: &'a ReasoningClient, config: &'a ReasoningConfig) -> Self {
        Self { reasoning, config }
    }

    /// Classify `intent` (spec.md §4.3). Fails open to `Specific` if the
    /// reasoning service is unavailable or its reply cannot be parsed —
    /// never block the user on a clarifier outage.
    pub async fn classify(&self, intent: &str) -> ClarifierDecision {
        let user_prompt = build_prompt(intent);

        let response = match self
            .reasoning
            .complete_json(None, SYSTEM_PROMPT, &user_prompt, self.config.clarifier_max_tokens)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "clarifier reasoning call failed, treating as specific");
                return ClarifierDecision::Specific;
            }
        };

        match archivist_reasoning::extract_json::<ClarifierJson>(&response.content) {
            Some(parsed) if parsed.vague => ClarifierDecision::Vague {
                follow_up_question: parsed
                    .follow_up_question
                    .unwrap_or_else(|| "Could you say more about what you're looking for?".to_string()),
            },
            Some(_) => ClarifierDecision::Specific,
            None => {
                tracing::warn!("clarifier reply did not parse as JSON, treating as specific");
                ClarifierDecision::Specific
            }
        }
    }
}

fn build_prompt(intent: &str) -> String {
    format!(
        r#"USER INTENT: "{intent}"

A query is vague only when plausible interpretations would produce substantively
different search parameters (for example, "John Smith" alone is ambiguous between
"messages BY John Smith" and "messages ABOUT John Smith"). A query is specific when
a domain-expert reader could reasonably infer the real question being asked.
Standard domain abbreviations (QME, IMR, PD, TD, LC, WCAB, SIBTF) do not make a
query vague. When in doubt, treat the query as specific.

If vague, write one professional, attorney-to-attorney follow-up question that
offers 2-3 concrete alternatives; do not lecture.

Respond in JSON format:
{{
  "vague": true/false,
  "follow_up_question": "string or null"
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vague_decision_carries_the_follow_up_question() {
        let decision = ClarifierDecision::Vague { follow_up_question: "By or about?".to_string() };
        assert_eq!(
            decision,
            ClarifierDecision::Vague { follow_up_question: "By or about?".to_string() }
        );
    }

    #[test]
    fn prompt_includes_the_raw_intent() {
        let prompt = build_prompt("Chris Johnson");
        assert!(prompt.contains("Chris Johnson"));
    }
}
