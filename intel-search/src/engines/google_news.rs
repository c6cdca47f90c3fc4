//! Google News RSS backend: real article links with headlines and dates.
//!
//! Fetched with the async HTTP client rather than the page fetcher: the feed
//! is plain XML and needs no browser-like treatment.

use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

use crate::config::SearchConfig;
use crate::engine::SearchBackendTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchBackend, SearchResult};

/// Google News RSS search backend.
pub struct GoogleNewsEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleNewsEngine {
    /// Create a backend with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::with_client(http::build_client(config)?, config))
    }

    /// Create a backend that reuses an existing client.
    pub fn with_client(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            endpoint: config.news_feed_url.clone(),
        }
    }

    /// Build the feed URL for `query` (US English edition).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configured endpoint is not a URL.
    pub fn feed_url(&self, query: &str) -> Result<Url, SearchError> {
        Url::parse_with_params(
            &self.endpoint,
            &[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
        )
        .map_err(|e| SearchError::Config(format!("invalid news_feed_url: {e}")))
    }
}

impl SearchBackendTrait for GoogleNewsEngine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Google News search");

        let url = self.feed_url(query)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(format!("Google News request timed out: {e}"))
                } else {
                    SearchError::Http(format!("Google News request failed: {e}"))
                }
            })?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Google News HTTP error: {e}")))?;

        let xml = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Google News response read failed: {e}")))?;

        parse_news_rss(&xml, limit)
    }

    fn backend_type(&self) -> SearchBackend {
        SearchBackend::GoogleNews
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Title,
    Link,
    PubDate,
    Source,
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    pub_date: String,
    source: String,
}

impl ItemBuilder {
    fn push(&mut self, field: ItemField, text: &str) {
        let target = match field {
            ItemField::Title => &mut self.title,
            ItemField::Link => &mut self.link,
            ItemField::PubDate => &mut self.pub_date,
            ItemField::Source => &mut self.source,
        };
        target.push_str(text);
    }

    fn finish(self) -> Option<SearchResult> {
        let title = unescape_html(self.title.trim());
        let link = self.link.trim().to_owned();
        if title.is_empty() || link.is_empty() {
            return None;
        }
        let pub_date = self.pub_date.trim();
        Some(SearchResult {
            title,
            url: link,
            snippet: String::new(),
            date: (!pub_date.is_empty()).then(|| pub_date.to_owned()),
            source: self.source.trim().to_owned(),
        })
    }
}

/// Longest entity reference resolved by [`unescape_html`], `&` and `;` included.
const MAX_ENTITY_LEN: usize = 10;

/// Headlines sometimes arrive double-escaped (`&amp;#39;`). Resolve the second
/// layer entity by entity; a bare `&` or an unknown reference stays literal.
fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let resolved = tail
            .find(';')
            .filter(|&end| end < MAX_ENTITY_LEN)
            .and_then(|end| {
                quick_xml::escape::unescape(&tail[..=end])
                    .ok()
                    .map(|s| (s.into_owned(), end + 1))
            });
        match resolved {
            Some((entity, consumed)) => {
                out.push_str(&entity);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse an RSS 2.0 document into news results.
///
/// Only `<item>` children are read; items missing a title or link are
/// skipped. Stops after `max_results` entries.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the XML is malformed before
/// `max_results` entries were collected.
pub fn parse_news_rss(xml: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let mut results = Vec::new();
    if max_results == 0 {
        return Ok(results);
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut item: Option<ItemBuilder> = None;
    let mut field: Option<ItemField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    item = Some(ItemBuilder::default());
                    field = None;
                }
                b"title" if item.is_some() => field = Some(ItemField::Title),
                b"link" if item.is_some() => field = Some(ItemField::Link),
                b"pubDate" if item.is_some() => field = Some(ItemField::PubDate),
                b"source" if item.is_some() => field = Some(ItemField::Source),
                _ => field = None,
            },
            Ok(Event::Text(t)) => {
                if let (Some(builder), Some(f)) = (item.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| SearchError::Parse(format!("bad RSS text: {e}")))?;
                    builder.push(f, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(builder), Some(f)) = (item.as_mut(), field) {
                    builder.push(f, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(entry) = item.take().and_then(ItemBuilder::finish) {
                        results.push(entry);
                        if results.len() >= max_results {
                            break;
                        }
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SearchError::Parse(format!(
                    "invalid RSS at byte {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }

    tracing::debug!(count = results.len(), "Google News entries parsed");
    Ok(results)
}
