//! `SynthesisResult`: the per-search aggregate verdict (spec.md §3, §4.7).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::search::QueryType;

/// The verdict label space across all evaluation modes. The allowed subset
/// is per-mode (spec.md §4.7); `normalize_for_mode` enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationLabel {
    Good,
    Bad,
    Mixed,
    InsufficientData,
    EasyToDealWith,
    Moderate,
    DifficultToDealWith,
    Error,
}

impl EvaluationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationLabel::Good => "good",
            EvaluationLabel::Bad => "bad",
            EvaluationLabel::Mixed => "mixed",
            EvaluationLabel::InsufficientData => "insufficient_data",
            EvaluationLabel::EasyToDealWith => "easy_to_deal_with",
            EvaluationLabel::Moderate => "moderate",
            EvaluationLabel::DifficultToDealWith => "difficult_to_deal_with",
            EvaluationLabel::Error => "error",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace(' ', "_").as_str() {
            "good" => Some(EvaluationLabel::Good),
            "bad" => Some(EvaluationLabel::Bad),
            "mixed" => Some(EvaluationLabel::Mixed),
            "insufficient_data" => Some(EvaluationLabel::InsufficientData),
            "easy_to_deal_with" => Some(EvaluationLabel::EasyToDealWith),
            "moderate" => Some(EvaluationLabel::Moderate),
            "difficult_to_deal_with" => Some(EvaluationLabel::DifficultToDealWith),
            "error" => Some(EvaluationLabel::Error),
            _ => None,
        }
    }

    /// Collapse a model-emitted label into the allowed set for `query_type`
    /// (spec.md §4.7). Defense-attorney evaluations additionally migrate
    /// the older `{good, mixed, bad}` scale onto the new one (spec.md §9's
    /// open question, resolved: see DESIGN.md).
    pub fn normalize_for_mode(self, query_type: QueryType) -> Self {
        match query_type {
            QueryType::DefenseAttorneyEval => match self {
                EvaluationLabel::EasyToDealWith
                | EvaluationLabel::Moderate
                | EvaluationLabel::DifficultToDealWith
                | EvaluationLabel::InsufficientData => self,
                EvaluationLabel::Good => EvaluationLabel::EasyToDealWith,
                EvaluationLabel::Bad => EvaluationLabel::DifficultToDealWith,
                EvaluationLabel::Mixed | EvaluationLabel::Error => EvaluationLabel::Moderate,
            },
            _ => match self {
                EvaluationLabel::Good
                | EvaluationLabel::Bad
                | EvaluationLabel::Mixed
                | EvaluationLabel::InsufficientData => self,
                _ => EvaluationLabel::Mixed,
            },
        }
    }
}

/// Per-search verdict, only for evaluation-mode searches (I6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub search_id: Uuid,
    /// Clamped to [0, 100].
    pub score: i32,
    pub evaluation: EvaluationLabel,
    pub reasoning: String,
}

impl SynthesisResult {
    pub fn new(search_id: Uuid, score: i32, evaluation: EvaluationLabel, reasoning: String) -> Self {
        Self {
            search_id,
            score: score.clamp(0, 100),
            evaluation,
            reasoning,
        }
    }

    /// The synthesis persisted directly, without invoking the Synthesizer,
    /// when fewer than 3 relevant messages exist (spec.md §4.7, §8 B3).
    pub fn insufficient_data(search_id: Uuid, reasoning: impl Into<String>) -> Self {
        Self {
            search_id,
            score: 0,
            evaluation: EvaluationLabel::InsufficientData,
            reasoning: reasoning.into(),
        }
    }
}

/// One candidate in an AME/QME recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecommendation {
    pub name: String,
    pub positive_mentions: i32,
    pub negative_mentions: i32,
    pub net_score: i32,
    pub sample_quotes: Vec<String>,
    pub warnings: Vec<String>,
}

/// The AME/QME synthesis shape: a ranked list rather than a scalar verdict
/// (spec.md §4.7). The logical `synthesis_results` table (spec.md §6) has
/// no columns for a ranked list, so this is serialized into the row's
/// `reasoning` field as JSON and `score` is set to the top candidate's
/// `net_score` (clamped); see DESIGN.md for the rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmeQmeRecommendation {
    pub doctors: Vec<DoctorRecommendation>,
    pub total_mentions: i32,
    pub reasoning: String,
}

impl AmeQmeRecommendation {
    /// Sort by `net_score` descending (spec.md §4.7).
    pub fn sorted(mut self) -> Self {
        self.doctors.sort_by(|a, b| b.net_score.cmp(&a.net_score));
        self
    }

    pub fn into_synthesis_result(self, search_id: Uuid) -> SynthesisResult {
        let score = self.doctors.first().map(|d| d.net_score).unwrap_or(0);
        let reasoning = serde_json::to_string(&self).unwrap_or_else(|_| self.reasoning.clone());
        SynthesisResult::new(search_id, score, EvaluationLabel::Good, reasoning)
    }

    pub fn from_synthesis_result(result: &SynthesisResult) -> Option<Self> {
        serde_json::from_str(&result.reasoning).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defense_attorney_migrates_old_labels() {
        assert_eq!(
            EvaluationLabel::Good.normalize_for_mode(QueryType::DefenseAttorneyEval),
            EvaluationLabel::EasyToDealWith
        );
        assert_eq!(
            EvaluationLabel::Bad.normalize_for_mode(QueryType::DefenseAttorneyEval),
            EvaluationLabel::DifficultToDealWith
        );
        assert_eq!(
            EvaluationLabel::Mixed.normalize_for_mode(QueryType::DefenseAttorneyEval),
            EvaluationLabel::Moderate
        );
    }

    #[test]
    fn out_of_set_label_collapses_to_mixed_for_doctor_eval() {
        assert_eq!(
            EvaluationLabel::EasyToDealWith.normalize_for_mode(QueryType::DoctorEval),
            EvaluationLabel::Mixed
        );
    }

    #[test]
    fn score_is_clamped() {
        let s = SynthesisResult::new(Uuid::nil(), 142, EvaluationLabel::Good, "x".to_string());
        assert_eq!(s.score, 100);
    }

    #[test]
    fn ame_qme_recommendation_round_trips_through_synthesis_result() {
        let rec = AmeQmeRecommendation {
            doctors: vec![DoctorRecommendation {
                name: "Dr. Lee".to_string(),
                positive_mentions: 5,
                negative_mentions: 1,
                net_score: 4,
                sample_quotes: vec!["thorough exam".to_string()],
                warnings: vec![],
            }],
            total_mentions: 6,
            reasoning: "one strong candidate".to_string(),
        }
        .sorted();

        let result = rec.clone().into_synthesis_result(Uuid::nil());
        assert_eq!(result.score, 4);

        let recovered = AmeQmeRecommendation::from_synthesis_result(&result).unwrap();
        assert_eq!(recovered.doctors[0].name, "Dr. Lee");
    }
}
