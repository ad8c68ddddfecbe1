//! Reads the externally-owned cookie jar (spec.md §4.5 session model,
//! §5 shared resources): a Playwright `storage_state` JSON file written by
//! the out-of-scope cookie-capture flow. The Retriever only ever reads this
//! file; it never writes to it or re-authenticates.

use std::path::Path;

use headless_chrome::protocol::cdp::Network::{CookieParam, CookieSameSite};
use serde::Deserialize;

use crate::error::{Result, RetrieverError};

#[derive(Debug, Deserialize)]
struct StorageState {
    #[serde(default)]
    cookies: Vec<StoredCookie>,
}

#[derive(Debug, Deserialize)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    #[serde(default)]
    expires: Option<f64>,
    #[serde(default, rename = "httpOnly")]
    http_only: bool,
    #[serde(default)]
    secure: bool,
    #[serde(default, rename = "sameSite")]
    same_site: Option<String>,
}

impl StoredCookie {
    fn into_cookie_param(self) -> CookieParam {
        CookieParam {
            name: self.name,
            value: self.value,
            url: None,
            domain: Some(self.domain),
            path: Some(self.path),
            secure: Some(self.secure),
            http_only: Some(self.http_only),
            same_site: self.same_site.as_deref().and_then(same_site_from_str),
            expires: self.expires,
            priority: None,
            same_party: None,
            source_scheme: None,
            source_port: None,
            partition_key: None,
        }
    }
}

fn same_site_from_str(s: &str) -> Option<CookieSameSite> {
    match s {
        "Strict" => Some(CookieSameSite::Strict),
        "Lax" => Some(CookieSameSite::Lax),
        "None" => Some(CookieSameSite::None),
        _ => None,
    }
}

/// Load the cookie jar at `path` and return it as CDP `CookieParam`s ready
/// to hand to `Tab::set_cookies`. Tolerates the jar being rewritten
/// underneath us between searches (spec.md §4.5) — it is re-read fresh on
/// every session attach, never cached across searches.
pub fn load_cookies(path: &Path) -> Result<Vec<CookieParam>> {
    let raw = std::fs::read_to_string(path).map_err(|source| RetrieverError::CookieJar {
        path: path.display().to_string(),
        source,
    })?;

    let state: StorageState = serde_json::from_str(&raw)
        .map_err(|e| RetrieverError::Shape(format!("cookie jar is not valid storage state JSON: {e}")))?;

    if state.cookies.is_empty() {
        return Err(RetrieverError::CookieExpired);
    }

    Ok(state.cookies.into_iter().map(StoredCookie::into_cookie_param).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_jar(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_cookies_from_storage_state_json() {
        let file = write_jar(
            r#"{"cookies": [{"name": "sid", "value": "abc123", "domain": ".example.org", "path": "/", "httpOnly": true, "secure": true}], "origins": []}"#,
        );

        let cookies = load_cookies(file.path()).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "sid");
        assert_eq!(cookies[0].value, "abc123");
    }

    #[test]
    fn empty_cookie_list_is_treated_as_expired() {
        let file = write_jar(r#"{"cookies": [], "origins": []}"#);
        let err = load_cookies(file.path()).unwrap_err();
        assert!(matches!(err, RetrieverError::CookieExpired));
    }

    #[test]
    fn missing_file_is_a_cookie_jar_error() {
        let err = load_cookies(Path::new("/nonexistent/path/auth.json")).unwrap_err();
        assert!(matches!(err, RetrieverError::CookieJar { .. }));
    }

    #[test]
    fn malformed_json_is_a_shape_error() {
        let file = write_jar("not json");
        let err = load_cookies(file.path()).unwrap_err();
        assert!(matches!(err, RetrieverError::Shape(_)));
    }
}
