//! HTML extraction rules (spec.md §4.5 "Result extraction" and
//! "Per-message fetch"). Grounded on `scraper.py`'s `_extract_message_ids`
//! and `_extract_clean_message_text`, reimplemented against `scraper`'s DOM
//! API the way the teacher's `indexers::services::web` parses fetched HTML
//! (`scraper::Html::parse_document` + CSS selectors) rather than Python's
//! BeautifulSoup.

use chrono::{NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, RetrieverError};

/// One row of the upstream result table, before the per-message body fetch.
#[derive(Debug, Clone)]
pub struct RawResultRow {
    pub upstream_id: i64,
    pub posted_at: chrono::DateTime<Utc>,
    pub from_display: String,
    pub from_email: Option<String>,
    pub listserv: String,
    pub subject: String,
    pub has_attachment: bool,
    /// 1-based rank across all pages seen so far (spec.md §4.5 ordering
    /// guarantee); assigned by the caller, not this module.
    pub position: u32,
    pub page: u32,
}

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("table.table-striped tbody tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static BOLD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("b").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

static HANDLER_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*(\d+)").unwrap());
static EMAIL_IN_ANGLE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([^>]+)>").unwrap());

/// Parse one results page into rows. `page` and `position_offset` let the
/// caller assign a global, cross-page 1-based position (spec.md §4.5).
///
/// Returns `Shape` if the table is present but no row yields a usable
/// message id — an empty, well-formed table ("no results") is not an error
/// and yields an empty `Vec` instead.
pub fn parse_result_rows(html: &str, page: u32, position_offset: u32) -> Result<Vec<RawResultRow>> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();
    let mut seen_any_row = false;

    for (idx, tr) in document.select(&ROW_SELECTOR).enumerate() {
        seen_any_row = true;

        // Header row: contains a <b> cell, matching scraper.py's skip rule.
        if tr.select(&BOLD_SELECTOR).next().is_some() {
            continue;
        }

        let cells: Vec<ElementRef> = tr.select(&CELL_SELECTOR).collect();
        if cells.len() < 5 {
            continue;
        }

        let date_str = cell_text(&cells[0]);
        let from_field = cell_text(&cells[1]);
        let listserv = cell_text(&cells[2]);
        let has_attachment = !cell_text(&cells[3]).is_empty();
        let subject_cell = &cells[4];

        let Some(anchor) = subject_cell.select(&ANCHOR_SELECTOR).next() else {
            continue;
        };
        let subject = anchor.text().collect::<String>().trim().to_string();

        let handler_attr = anchor
            .value()
            .attr("onclick")
            .or_else(|| anchor.value().attr("href"))
            .unwrap_or("");

        let Some(upstream_id) = extract_handler_id(handler_attr) else {
            continue;
        };

        let Some(posted_at) = parse_two_digit_year_date(&date_str) else {
            continue;
        };

        rows.push(RawResultRow {
            upstream_id,
            posted_at,
            from_email: extract_email(&from_field),
            from_display: from_field,
            listserv,
            subject,
            has_attachment,
            position: position_offset + idx as u32 + 1,
            page,
        });
    }

    if seen_any_row && rows.is_empty() {
        return Err(RetrieverError::Shape(
            "result table present but no row yielded a usable message id".to_string(),
        ));
    }

    // Re-pack positions contiguously: header/skipped rows must not create
    // gaps in the cross-page 1-based ordering.
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = position_offset + i as u32 + 1;
    }

    Ok(rows)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract the numeric id from a JS handler attribute of the form
/// `handler(<id>, ...)` (spec.md §4.5), e.g. `b_loadmsgjson(21777803,'','responsive')`.
fn extract_handler_id(attr: &str) -> Option<i64> {
    HANDLER_ID.captures(attr)?.get(1)?.as_str().parse().ok()
}

fn extract_email(from_str: &str) -> Option<String> {
    EMAIL_IN_ANGLE_BRACKETS.captures(from_str).map(|c| c[1].to_string())
}

/// Parse the upstream's `MM/DD/YY` date into a full UTC timestamp at
/// midnight; a 2-digit year is interpreted as `2000 + YY` (spec.md §4.5).
fn parse_two_digit_year_date(raw: &str) -> Option<chrono::DateTime<Utc>> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let month: u32 = parts[0].parse().ok()?;
    let day: u32 = parts[1].parse().ok()?;
    let mut year: i32 = parts[2].parse().ok()?;
    if parts[2].len() <= 2 {
        year += 2000;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

static HEADER_SPAN_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static LTR_DIV_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div[dir=\"ltr\"]").unwrap());
static BLOCKQUOTE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("blockquote").unwrap());

/// Extracted header fields plus the cleaned body of one full message view
/// (spec.md §4.5 "Per-message fetch", body extraction rules 1–3).
#[derive(Debug, Clone, Default)]
pub struct CleanedMessage {
    pub from: Option<String>,
    pub subject: Option<String>,
    pub body: String,
}

/// Clean a message container's inner HTML into header fields plus a body.
///
/// Rule 1: prefer the first top-level `div[dir="ltr"]` not nested inside a
/// `blockquote`, keeping its full text (quotes included — the Scorer
/// benefits from thread context).
/// Rule 2: fall back to the whole container's text with the `From:`/`Date:`/
/// `Subject:` header lines stripped.
pub fn clean_message_html(html: &str) -> CleanedMessage {
    let fragment = Html::parse_fragment(html);

    let mut result = CleanedMessage::default();

    for span in fragment.select(&HEADER_SPAN_SELECTOR).take(3) {
        let text = span.text().collect::<String>();
        if let Some(rest) = text.strip_prefix("From:") {
            result.from = Some(rest.trim().to_string());
        } else if let Some(rest) = text.strip_prefix("Subject:") {
            result.subject = Some(rest.trim().to_string());
        }
    }

    for div in fragment.select(&LTR_DIV_SELECTOR) {
        if has_blockquote_ancestor(&div) {
            continue;
        }

        let mut parts = Vec::new();
        for child in div.children() {
            if let Some(el) = scraper::ElementRef::wrap(child) {
                if el.value().name() == "blockquote" {
                    break;
                }
                parts.push(el.text().collect::<String>().trim().to_string());
            } else if let Some(text_node) = child.value().as_text() {
                parts.push(text_node.trim().to_string());
            }
        }

        let body = parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");
        if !body.is_empty() {
            result.body = body.trim().to_string();
            return result;
        }
    }

    // Fallback: whole-container text, header lines stripped.
    let full_text: String = fragment.root_element().text().collect();
    result.body = full_text
        .lines()
        .filter(|line| {
            let t = line.trim();
            !(t.starts_with("From:") || t.starts_with("Date:") || t.starts_with("Subject:"))
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    result
}

fn has_blockquote_ancestor(el: &ElementRef) -> bool {
    el.ancestors().any(|a| {
        scraper::ElementRef::wrap(a).map(|e| e.value().name() == "blockquote").unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numeric_id_from_onclick_handler() {
        assert_eq!(
            extract_handler_id("javascript:b_loadmsgjson(21777803,'','responsive')"),
            Some(21777803)
        );
    }

    #[test]
    fn missing_handler_id_returns_none() {
        assert_eq!(extract_handler_id("javascript:void(0)"), None);
    }

    #[test]
    fn two_digit_year_is_interpreted_as_2000s() {
        let parsed = parse_two_digit_year_date("10/29/25").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2025, 10, 29).unwrap());
    }

    #[test]
    fn four_digit_year_is_kept_as_is() {
        let parsed = parse_two_digit_year_date("1/5/2024").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn extracts_email_from_angle_brackets() {
        assert_eq!(
            extract_email("Jane Doe <jane@example.com>"),
            Some("jane@example.com".to_string())
        );
    }

    #[test]
    fn no_email_returns_none() {
        assert_eq!(extract_email("Jane Doe"), None);
    }

    #[test]
    fn parses_simple_results_table() {
        let html = r#"
            <table class="table-striped">
              <tbody>
                <tr><td><b>Date</b></td><td>From</td><td>List</td><td>Attach</td><td>Subject</td></tr>
                <tr>
                  <td>10/29/25</td>
                  <td>Jane Doe &lt;jane@example.com&gt;</td>
                  <td>lawnet</td>
                  <td></td>
                  <td><a onclick="javascript:b_loadmsgjson(555,'','responsive')" href="#">Re: SIBTF</a></td>
                </tr>
              </tbody>
            </table>
        "#;

        let rows = parse_result_rows(html, 1, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].upstream_id, 555);
        assert_eq!(rows[0].subject, "Re: SIBTF");
        assert_eq!(rows[0].from_email.as_deref(), Some("jane@example.com"));
        assert!(!rows[0].has_attachment);
        assert_eq!(rows[0].position, 1);
    }

    #[test]
    fn empty_table_yields_no_rows_without_error() {
        let html = r#"<table class="table-striped"><tbody></tbody></table>"#;
        let rows = parse_result_rows(html, 1, 0).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn clean_message_prefers_top_level_ltr_div() {
        let html = r#"
            <div>
              <span>From: Jane Doe</span>
              <span>Subject: Re: SIBTF</span>
              <div dir="ltr">This is the real reply.<blockquote>On Mon, original text...</blockquote></div>
            </div>
        "#;
        let cleaned = clean_message_html(html);
        assert_eq!(cleaned.from.as_deref(), Some("Jane Doe"));
        assert_eq!(cleaned.subject.as_deref(), Some("Re: SIBTF"));
        assert!(cleaned.body.contains("This is the real reply."));
        assert!(!cleaned.body.contains("original text"));
    }
}
