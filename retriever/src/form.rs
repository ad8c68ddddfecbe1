//! Form submission against the upstream search page (spec.md §4.5 "Form
//! submission"). Grounded on `scraper.py`'s `_execute_search`: for every
//! `s_*` field, find the input or select, preferring the visible element
//! when a name is duplicated between the visible and hidden advanced
//! panel, and fall back to direct JS value assignment for date fields
//! (which resist focus-and-type in the real upstream UI).
//!
//! Rather than branch between a click/type path and a JS path per field,
//! every field is set through one JS snippet that finds the first visible
//! match and assigns its value directly, dispatching `input`/`change` so
//! upstream listeners still fire. This keeps the "duplicate name, date
//! quirk, missing field" handling in one place instead of three.

use std::collections::BTreeMap;

use headless_chrome::Tab;

use crate::error::{Result, RetrieverError};

const SET_FIELD_JS: &str = r#"
(function(name, value) {
    function isVisible(el) {
        const rect = el.getBoundingClientRect();
        return !!(el.offsetParent !== null || rect.width || rect.height);
    }

    let inputs = Array.from(document.querySelectorAll('input[name="' + name + '"]'));
    let target = inputs.find(isVisible) || inputs[0];

    if (target) {
        target.value = value;
        target.dispatchEvent(new Event('input', { bubbles: true }));
        target.dispatchEvent(new Event('change', { bubbles: true }));
        return 'input';
    }

    let select = document.querySelector('select[name="' + name + '"]');
    if (select) {
        select.value = value;
        select.dispatchEvent(new Event('change', { bubbles: true }));
        return 'select';
    }

    return null;
})
"#;

/// Set one named form field through direct DOM assignment. Returns `Ok(())`
/// even when no matching element was found — missing/non-interactable
/// fields are skipped with a warning, never fail the submission
/// (spec.md §4.5).
pub fn set_field(tab: &Tab, field_name: &str, field_value: &str) -> Result<()> {
    let call = format!(
        "({})({}, {})",
        SET_FIELD_JS,
        serde_json::to_string(field_name).unwrap(),
        serde_json::to_string(field_value).unwrap(),
    );

    match tab.evaluate(&call, false) {
        Ok(result) => {
            if result.value.is_none() {
                tracing::warn!(field = field_name, "form field not found on upstream page, skipping");
            }
            Ok(())
        }
        Err(e) => {
            tracing::warn!(field = field_name, error = %e, "could not set form field, skipping");
            Ok(())
        }
    }
}

/// Fill every field in `form` and submit, matching spec.md §4.5's selector
/// fallback chain for the search button: `#s_btn`, then
/// `input[name="s_btn"]`, then any `button[type="submit"],
/// input[type="submit"]`.
pub fn fill_and_submit(tab: &Tab, form: &BTreeMap<&'static str, String>) -> Result<()> {
    for (field_name, field_value) in form {
        set_field(tab, field_name, field_value)?;
    }

    if tab.find_element("#s_btn").and_then(|el| el.click()).is_ok() {
        return Ok(());
    }

    if tab
        .find_element("input[name=\"s_btn\"]")
        .and_then(|el| el.click())
        .is_ok()
    {
        return Ok(());
    }

    tab.find_element("button[type=\"submit\"], input[type=\"submit\"]")
        .and_then(|el| el.click())
        .map(|_| ())
        .map_err(|e| RetrieverError::Shape(format!("could not find a search submit button: {e}")))
}
