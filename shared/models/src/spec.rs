//! `SearchSpec`: the immutable value type describing one retrieval request.
//!
//! Grounded on the original `SearchParams` dataclass (`search_params.py`):
//! same field catalog, same upstream form names, reimplemented as a closed,
//! tagged value type per spec.md §9's note against open-ended key/value bags.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which upstream sub-forum to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Listserv {
    All,
    Lawnet,
    Lavaaa,
    Lamaaa,
    Scaaa,
}

impl Listserv {
    pub fn as_str(&self) -> &'static str {
        match self {
            Listserv::All => "all",
            Listserv::Lawnet => "lawnet",
            Listserv::Lavaaa => "lavaaa",
            Listserv::Lamaaa => "lamaaa",
            Listserv::Scaaa => "scaaa",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(Listserv::All),
            "lawnet" => Some(Listserv::Lawnet),
            "lavaaa" => Some(Listserv::Lavaaa),
            "lamaaa" => Some(Listserv::Lamaaa),
            "scaaa" => Some(Listserv::Scaaa),
            _ => None,
        }
    }
}

impl Default for Listserv {
    fn default() -> Self {
        Listserv::All
    }
}

/// Where keyword fields are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIn {
    SubjectAndBody,
    SubjectOnly,
}

impl Default for SearchIn {
    fn default() -> Self {
        SearchIn::SubjectAndBody
    }
}

/// Attachment presence filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentFilter {
    All,
    WithAttachments,
    WithoutAttachments,
}

impl Default for AttachmentFilter {
    fn default() -> Self {
        AttachmentFilter::All
    }
}

/// Normalize a multi-term keyword field per the canonicalization rule
/// (spec.md §4.1): comma-separated when present; otherwise split on
/// whitespace; strip each term, drop empties, preserve order.
pub fn canonicalize_terms(raw: &str) -> Vec<String> {
    let terms: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split_whitespace().collect()
    };

    terms
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn canonicalize_joined(raw: &str) -> String {
    canonicalize_terms(raw).join(", ")
}

/// All retrieval parameters for one search. Produced by the QueryPlanner,
/// consumed by the Orchestrator and Retriever, persisted verbatim by the
/// Store. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Every term must appear (comma-delimited when multi-term).
    pub keywords_all: Option<String>,
    /// Exact substring match; never canonicalized (it is one phrase).
    pub keywords_phrase: Option<String>,
    /// At least one term must appear.
    pub keywords_any: Option<String>,
    /// None of these terms may appear.
    pub keywords_exclude: Option<String>,
    /// Upstream's basic keyword input (single term or phrase, not a list).
    pub simple: Option<String>,

    /// Filters by sender display name.
    pub posted_by: Option<String>,
    /// Filters by the archive's expert/witness first-name field.
    pub author_first_name: Option<String>,
    /// Filters by the archive's expert/witness last-name field.
    pub author_last_name: Option<String>,

    pub listserv: Listserv,
    pub search_in: SearchIn,

    pub attachment_filter: AttachmentFilter,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,

    pub max_messages: u32,
    pub max_pages: u32,
}

const DEFAULT_MAX_MESSAGES: u32 = 100;
const DEFAULT_MAX_PAGES: u32 = 10;

impl SearchSpec {
    /// A spec with every cap set to its default and every filter empty.
    pub fn new() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            max_pages: DEFAULT_MAX_PAGES,
            ..Default::default()
        }
    }

    /// The concrete upstream form-field map (spec.md §6). Only non-default
    /// fields are emitted; multi-term fields are serialized comma-joined;
    /// dates are serialized MM/DD/YYYY.
    pub fn to_upstream_form(&self) -> BTreeMap<&'static str, String> {
        let mut form = BTreeMap::new();

        // `simple` and `author_first_name` both target the upstream's
        // repurposed first-name field; a spec should set at most one, but
        // if both are present author_first_name (the more specific filter)
        // wins, matching the original's field-assignment order.
        if let Some(simple) = &self.simple {
            if !simple.is_empty() {
                form.insert("s_fname", simple.clone());
            }
        }
        if let Some(first) = &self.author_first_name {
            if !first.is_empty() {
                form.insert("s_fname", first.clone());
            }
        }
        if let Some(last) = &self.author_last_name {
            if !last.is_empty() {
                form.insert("s_lname", last.clone());
            }
        }
        if let Some(posted_by) = &self.posted_by {
            if !posted_by.is_empty() {
                form.insert("s_postedby", posted_by.clone());
            }
        }

        if let Some(all) = &self.keywords_all {
            let joined = canonicalize_joined(all);
            if !joined.is_empty() {
                form.insert("s_key_all", joined);
            }
        }
        if let Some(phrase) = &self.keywords_phrase {
            if !phrase.trim().is_empty() {
                form.insert("s_key_phrase", phrase.trim().to_string());
            }
        }
        if let Some(any) = &self.keywords_any {
            let joined = canonicalize_joined(any);
            if !joined.is_empty() {
                form.insert("s_key_one", joined);
            }
        }
        if let Some(exclude) = &self.keywords_exclude {
            let joined = canonicalize_joined(exclude);
            if !joined.is_empty() {
                form.insert("s_key_x", joined);
            }
        }

        if self.listserv != Listserv::All {
            form.insert("s_list", self.listserv.as_str().to_string());
        }
        if self.search_in == SearchIn::SubjectOnly {
            form.insert("s_cat", "1".to_string());
        }
        match self.attachment_filter {
            AttachmentFilter::WithAttachments => {
                form.insert("s_attachment", "1".to_string());
            }
            AttachmentFilter::WithoutAttachments => {
                form.insert("s_attachment", "0".to_string());
            }
            AttachmentFilter::All => {}
        }

        if let Some(from) = self.date_from {
            form.insert("s_postdatefrom", from.format("%m/%d/%Y").to_string());
        }
        if let Some(to) = self.date_to {
            form.insert("s_postdateto", to.format("%m/%d/%Y").to_string());
        }

        form
    }
}

impl fmt::Display for SearchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(v) = &self.simple {
            parts.push(format!("keyword='{v}'"));
        }
        if let Some(v) = &self.keywords_all {
            parts.push(format!("all_keywords='{v}'"));
        }
        if let Some(v) = &self.keywords_phrase {
            parts.push(format!("exact_phrase='{v}'"));
        }
        if let Some(v) = &self.keywords_any {
            parts.push(format!("any_keywords='{v}'"));
        }
        if let Some(v) = &self.keywords_exclude {
            parts.push(format!("exclude_keywords='{v}'"));
        }
        if let Some(v) = &self.posted_by {
            parts.push(format!("posted_by='{v}'"));
        }
        if let Some(v) = &self.author_first_name {
            parts.push(format!("author_first_name='{v}'"));
        }
        if let Some(v) = &self.author_last_name {
            parts.push(format!("author_last_name='{v}'"));
        }
        if self.listserv != Listserv::All {
            parts.push(format!("listserv={}", self.listserv.as_str()));
        }
        if self.search_in == SearchIn::SubjectOnly {
            parts.push("search_in=subject_only".to_string());
        }
        if self.attachment_filter != AttachmentFilter::All {
            parts.push(format!("attachment_filter={:?}", self.attachment_filter));
        }
        if let Some(v) = self.date_from {
            parts.push(format!("date_from={v}"));
        }
        if let Some(v) = self.date_to {
            parts.push(format!("date_to={v}"));
        }

        if parts.is_empty() {
            write!(f, "SearchSpec(empty)")
        } else {
            write!(f, "SearchSpec({})", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_comma_lists() {
        assert_eq!(
            canonicalize_terms(" SIBTF ,  application ,,Subsequent Injuries "),
            vec!["SIBTF", "application", "Subsequent Injuries"]
        );
    }

    #[test]
    fn canonicalizes_space_delimited_fallback() {
        assert_eq!(canonicalize_terms("a b c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn to_upstream_form_emits_only_non_defaults() {
        let mut spec = SearchSpec::new();
        spec.keywords_any = Some("SIBTF, application".to_string());
        let form = spec.to_upstream_form();

        assert_eq!(form.get("s_key_one"), Some(&"SIBTF, application".to_string()));
        assert!(!form.contains_key("s_list"));
        assert!(!form.contains_key("s_cat"));
        assert!(!form.contains_key("s_attachment"));
    }

    #[test]
    fn to_upstream_form_maps_dates_mmddyyyy() {
        let mut spec = SearchSpec::new();
        spec.date_from = Some(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let form = spec.to_upstream_form();
        assert_eq!(form.get("s_postdatefrom"), Some(&"01/05/2026".to_string()));
    }

    #[test]
    fn author_first_name_wins_over_simple_on_same_wire_field() {
        let mut spec = SearchSpec::new();
        spec.simple = Some("SIBTF".to_string());
        spec.author_first_name = Some("Maria".to_string());
        let form = spec.to_upstream_form();
        assert_eq!(form.get("s_fname"), Some(&"Maria".to_string()));
    }

    #[test]
    fn round_trip_is_idempotent_up_to_canonicalization() {
        let mut spec = SearchSpec::new();
        spec.keywords_all = Some("a b c".to_string());
        let first = spec.to_upstream_form();

        spec.keywords_all = Some(first.get("s_key_all").unwrap().clone());
        let second = spec.to_upstream_form();

        assert_eq!(first.get("s_key_all"), second.get("s_key_all"));
    }
}
