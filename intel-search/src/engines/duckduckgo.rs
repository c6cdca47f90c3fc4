//! DuckDuckGo web search through the page fetcher.
//!
//! Uses the HTML-only results page at `https://html.duckduckgo.com/html/`,
//! which needs no JavaScript. The page is retrieved with the injected
//! [`PageFetcher`] on the [`BlockingPool`], so whatever fetch strategy the
//! operator plugs in also applies to search.

use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::engine::SearchBackendTrait;
use crate::error::SearchError;
use crate::executor::BlockingPool;
use crate::fetch::PageFetcher;
use crate::types::{SearchBackend, SearchResult};

/// DuckDuckGo HTML search backend.
pub struct DuckDuckGoEngine {
    fetcher: Arc<dyn PageFetcher>,
    pool: BlockingPool,
    endpoint: String,
    timeout: Duration,
}

impl DuckDuckGoEngine {
    /// Create a backend that fetches through `fetcher` on `pool`.
    pub fn new(fetcher: Arc<dyn PageFetcher>, pool: BlockingPool, config: &SearchConfig) -> Self {
        Self {
            fetcher,
            pool,
            endpoint: config.web_search_url.clone(),
            timeout: Duration::from_secs(config.fetch_timeout_seconds),
        }
    }

    /// Build the results-page URL for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configured endpoint is not a URL.
    pub fn query_url(&self, query: &str) -> Result<String, SearchError> {
        Url::parse_with_params(&self.endpoint, &[("q", query)])
            .map(String::from)
            .map_err(|e| SearchError::Config(format!("invalid web_search_url: {e}")))
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter and URL-decode it. Links that
    /// are not wrapped are kept only if they are already absolute `http` URLs.
    fn extract_url(href: &str) -> Option<String> {
        // Handle protocol-relative and site-relative redirect links.
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else if href.starts_with("/l/") {
            format!("https://duckduckgo.com{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.path().starts_with("/l/")
            && parsed
                .host_str()
                .is_some_and(|h| h.ends_with("duckduckgo.com"))
        {
            return parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
                .filter(|target| target.starts_with("http"));
        }

        full_href.starts_with("http").then_some(full_href)
    }
}

impl SearchBackendTrait for DuckDuckGoEngine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let url = self.query_url(query)?;
        let fetcher = Arc::clone(&self.fetcher);
        let html = self
            .pool
            .run(self.timeout, move || fetcher.fetch(&url))
            .await??;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, limit)
    }

    fn backend_type(&self) -> SearchBackend {
        SearchBackend::DuckDuckGo
    }
}

/// Parse a DuckDuckGo HTML results page into search results.
///
/// Extracted as a separate function for testability with mock HTML.
pub fn parse_duckduckgo_html(html: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(".result:not(.result--ad)")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__title a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;
    let source_sel = Selector::parse(".result__url")
        .map_err(|e| SearchError::Parse(format!("invalid source selector: {e:?}")))?;

    let mut results = Vec::new();
    if max_results == 0 {
        return Ok(results);
    }

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(href) = title_el.value().attr("href") else {
            continue;
        };

        let Some(url) = DuckDuckGoEngine::extract_url(href) else {
            continue;
        };

        let text_of = |sel: &Selector| {
            element
                .select(sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default()
        };

        results.push(SearchResult {
            title,
            url,
            snippet: text_of(&snippet_sel),
            date: None,
            source: text_of(&source_sel),
        });

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
