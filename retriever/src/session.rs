//! The authenticated browser session (spec.md §4.5 "Session model").
//! Grounded on `scraper.py`'s `CAAAScraper.__init__`/`scrape`: one browser
//! context per worker, attached to an externally-owned cookie jar, reused
//! for the whole search and torn down at the end. `headless_chrome`'s API
//! is synchronous (it drives Chrome over CDP on its own thread pool), so
//! every method here blocks; the async boundary lives in `retriever.rs`,
//! which runs these through `tokio::task::spawn_blocking`.

use std::path::Path;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};

use archivist_config::RetrieverConfig;

use crate::cookie_jar;
use crate::error::{Result, RetrieverError};
use crate::form;

/// Selectors the upstream result page may settle into after a search is
/// submitted (spec.md §4.5 "wait for either the results table, a
/// 'no results' indicator, or the upstream's result-count banner").
const RESULT_SETTLED_SELECTORS: &[&str] =
    &["table.table-striped tbody tr", ".resultMsgExposition", ".s_rnfne"];

/// The JS handler the upstream result page calls to load one message's full
/// view in place (grounded on the original's `b_loadmsgjson`, wire-exact
/// per spec.md §6's treatment of upstream-specific identifiers).
const MESSAGE_HANDLER_JS_FN: &str = "b_loadmsgjson";

const MESSAGE_CONTAINER_SELECTOR: &str = "#s_lyris_messagewindow";

pub struct Session {
    // Kept alive for the session's lifetime; dropping it kills the tab.
    _browser: Browser,
    tab: std::sync::Arc<Tab>,
    config: RetrieverConfig,
}

impl Session {
    /// Launch a headless browser, attach the externally-owned cookie jar,
    /// and navigate to the search page. Never creates a new login — if the
    /// jar is missing or empty, the upstream will simply treat the session
    /// as unauthenticated and later steps will fail with `Shape` or time
    /// out, which the caller maps to `CookieExpired` semantics upstream.
    pub fn attach(config: &RetrieverConfig) -> Result<Self> {
        let launch_options = LaunchOptionsBuilder::default()
            .headless(true)
            .build()
            .map_err(|e| RetrieverError::Navigation(format!("failed to configure browser: {e}")))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| RetrieverError::Navigation(format!("failed to launch browser: {e}")))?;

        let tab = browser
            .new_tab()
            .map_err(|e| RetrieverError::Navigation(format!("failed to open tab: {e}")))?;

        let cookies = cookie_jar::load_cookies(Path::new(&config.cookie_jar_path))?;
        tab.set_cookies(cookies)
            .map_err(|e| RetrieverError::CookieJar {
                path: config.cookie_jar_path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })?;

        Ok(Self { _browser: browser, tab, config: config.clone() })
    }

    /// Navigate to the search page and submit `form` (spec.md §4.5 "Form
    /// submission"), then wait for the result page to settle.
    pub fn execute_search(&self, form: &std::collections::BTreeMap<&'static str, String>) -> Result<()> {
        archivist_observability::log_external_call!("upstream_archive", self.config.search_url.as_str());

        self.tab
            .navigate_to(&self.config.search_url)
            .map_err(|e| RetrieverError::Navigation(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| RetrieverError::Navigation(e.to_string()))?;

        form::fill_and_submit(&self.tab, form)?;

        self.wait_for_results_settled()
    }

    fn wait_for_results_settled(&self) -> Result<()> {
        let deadline = std::time::Instant::now() + self.config.results_wait_timeout;
        let poll_interval = Duration::from_millis(250);

        loop {
            for selector in RESULT_SETTLED_SELECTORS {
                if self.tab.find_element(selector).is_ok() {
                    return Ok(());
                }
            }

            if std::time::Instant::now() >= deadline {
                return Err(RetrieverError::Timeout("search results to settle"));
            }

            std::thread::sleep(poll_interval);
        }
    }

    /// The current page's full rendered HTML, for row/body extraction via
    /// `scraper` (the teacher's pattern of parsing fetched HTML strings
    /// rather than walking live CDP element handles).
    pub fn page_html(&self) -> Result<String> {
        self.tab.get_content().map_err(|e| RetrieverError::Navigation(e.to_string()))
    }

    /// Try to advance to page `next_page_num` (spec.md §4.5 "Pagination").
    /// Returns `false` when no pagination control succeeds, which the
    /// caller treats as "no more pages" rather than an error.
    pub fn go_to_next_page(&self, next_page_num: u32) -> Result<bool> {
        let script = format!(
            r#"
            (function(nextPageNum) {{
                const bar = document.querySelector('#seachResultsPaginationBar');
                if (!bar) return 'none';
                const links = Array.from(bar.querySelectorAll('a'));

                const numeric = links.find(a => a.textContent.trim() === String(nextPageNum));
                if (numeric) {{ numeric.click(); return 'numeric'; }}

                const nextCtl = bar.querySelector('a[title="Next Page"]');
                if (nextCtl) {{
                    const href = nextCtl.getAttribute('href') || '';
                    if (href.startsWith('javascript:')) {{
                        // eslint-disable-next-line no-eval
                        eval(href.slice('javascript:'.length));
                        return 'js-href';
                    }}
                    nextCtl.click();
                    return 'next-control';
                }}

                const textNext = links.find(a => a.textContent.trim().toLowerCase() === 'next');
                if (textNext) {{ textNext.click(); return 'text-next'; }}

                return 'none';
            }})({next_page_num})
            "#
        );

        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| RetrieverError::Navigation(e.to_string()))?;

        let strategy = result.value.as_ref().and_then(|v| v.as_str()).unwrap_or("none");
        tracing::debug!(strategy, next_page_num, "pagination attempt");

        if strategy == "none" {
            return Ok(false);
        }

        std::thread::sleep(self.config.pagination_pause);
        Ok(true)
    }

    /// Open the full view for `upstream_id` and return its container's
    /// inner HTML (spec.md §4.5 "Per-message fetch"): invoke the known JS
    /// handler, falling back to clicking the row's anchor, and finally to
    /// a direct URL with the id as a query parameter.
    pub fn fetch_message_html(&self, upstream_id: i64) -> Result<String> {
        let invoke = format!("{MESSAGE_HANDLER_JS_FN}({upstream_id},'','responsive');");

        if self.tab.evaluate(&invoke, false).is_err() {
            let anchor_selector = format!("a[onclick*=\"{upstream_id}\"]");
            if self.tab.find_element(&anchor_selector).and_then(|el| el.click()).is_err() {
                let direct_url = format!("{}&msg_id={upstream_id}", self.config.search_url);
                self.tab
                    .navigate_to(&direct_url)
                    .map_err(|e| RetrieverError::Navigation(e.to_string()))?;
            }
        }

        std::thread::sleep(self.config.fetch_pause);

        self.tab
            .wait_for_element_with_custom_timeout(MESSAGE_CONTAINER_SELECTOR, self.config.message_wait_timeout)
            .map_err(|_| RetrieverError::Timeout("message container"))?;

        let extract = format!(
            "document.querySelector('{MESSAGE_CONTAINER_SELECTOR}') ? document.querySelector('{MESSAGE_CONTAINER_SELECTOR}').innerHTML : ''"
        );

        let result = self
            .tab
            .evaluate(&extract, false)
            .map_err(|e| RetrieverError::Navigation(e.to_string()))?;

        Ok(result.value.as_ref().and_then(|v| v.as_str()).unwrap_or("").to_string())
    }
}
