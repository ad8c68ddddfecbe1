//! `Search`: one user request and its lifecycle (spec.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::spec::SearchSpec;
use crate::Model;

/// The kind of question a search answers. Evaluation modes produce a
/// `SynthesisResult`; `General` and `AmeQmeSearch` differ only in whether
/// the synthesis is a scalar verdict or a ranked recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    General,
    DoctorEval,
    JudgeEval,
    AdjusterEval,
    DefenseAttorneyEval,
    InsuranceCompanyEval,
    AmeQmeSearch,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::General => "general",
            QueryType::DoctorEval => "doctor_eval",
            QueryType::JudgeEval => "judge_eval",
            QueryType::AdjusterEval => "adjuster_eval",
            QueryType::DefenseAttorneyEval => "defense_attorney_eval",
            QueryType::InsuranceCompanyEval => "insurance_company_eval",
            QueryType::AmeQmeSearch => "ame_qme_search",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "general" => Some(QueryType::General),
            "doctor_eval" => Some(QueryType::DoctorEval),
            "judge_eval" => Some(QueryType::JudgeEval),
            "adjuster_eval" => Some(QueryType::AdjusterEval),
            "defense_attorney_eval" => Some(QueryType::DefenseAttorneyEval),
            "insurance_company_eval" => Some(QueryType::InsuranceCompanyEval),
            "ame_qme_search" => Some(QueryType::AmeQmeSearch),
            _ => None,
        }
    }

    /// Whether this query type produces a `SynthesisResult` (spec.md §3, I6;
    /// §8 P5). `AmeQmeSearch` counts: its synthesis is a ranked list rather
    /// than a scalar verdict, but it is still gated on the same rule.
    pub fn is_evaluation_mode(&self) -> bool {
        !matches!(self, QueryType::General)
    }
}

/// Durable lifecycle state of a search (spec.md §4.8's state machine).
/// `running` covers both "retrieving" and "scored but not yet synthesized" --
/// the distinction is tracked by which counters are non-zero, not by a
/// separate status value, matching the state machine in spec.md §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Pending => "pending",
            SearchStatus::Running => "running",
            SearchStatus::Completed => "completed",
            SearchStatus::Failed => "failed",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SearchStatus::Pending),
            "running" => Some(SearchStatus::Running),
            "completed" => Some(SearchStatus::Completed),
            "failed" => Some(SearchStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchStatus::Completed | SearchStatus::Failed)
    }
}

/// One user request and its running counters (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    pub id: Uuid,
    /// Monotonic per-user sequence; display only.
    pub search_number: i64,
    pub spec: SearchSpec,
    /// The question the REAL analysis is anchored to.
    pub real_question: String,
    pub query_type: QueryType,
    pub status: SearchStatus,

    pub messages_found: i32,
    pub analyzed: i32,
    pub relevant: i32,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Search {
    pub fn new(
        id: Uuid,
        search_number: i64,
        spec: SearchSpec,
        real_question: String,
        query_type: QueryType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            search_number,
            spec,
            real_question,
            query_type,
            status: SearchStatus::Pending,
            messages_found: 0,
            analyzed: 0,
            relevant: 0,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }
}

impl Model for Search {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_general_is_not_an_evaluation_mode() {
        assert!(!QueryType::General.is_evaluation_mode());
        assert!(QueryType::DoctorEval.is_evaluation_mode());
        assert!(QueryType::AmeQmeSearch.is_evaluation_mode());
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            SearchStatus::Pending,
            SearchStatus::Running,
            SearchStatus::Completed,
            SearchStatus::Failed,
        ] {
            assert_eq!(SearchStatus::from_str_loose(s.as_str()), Some(s));
        }
    }
}
