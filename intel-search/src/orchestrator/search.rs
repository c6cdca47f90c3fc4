//! Concurrent two-backend search: DuckDuckGo web results plus Google News.
//!
//! Both backends are queried at the same time so latency tracks the slower
//! of the two rather than their sum. The news feed is supplementary: its
//! failures degrade to an empty list. The web backend is essential: if it
//! fails and the feed has nothing either, the search fails.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::engine::SearchBackendTrait;
use crate::engines::{DuckDuckGoEngine, GoogleNewsEngine};
use crate::error::SearchError;
use crate::executor::BlockingPool;
use crate::fetch::PageFetcher;
use crate::types::SearchResult;

use super::dedup::merge_by_host;

/// Searches the web and news backends concurrently and merges the results.
pub struct MultiSourceSearcher<W = DuckDuckGoEngine, N = GoogleNewsEngine> {
    web: W,
    news: N,
    web_limit: usize,
    news_limit: usize,
}

impl MultiSourceSearcher {
    /// Build the production searcher: DuckDuckGo through `fetcher` on `pool`,
    /// Google News over its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid and
    /// [`SearchError::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(
        fetcher: Arc<dyn PageFetcher>,
        pool: BlockingPool,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self::new(
            DuckDuckGoEngine::new(fetcher, pool, config),
            GoogleNewsEngine::new(config)?,
            config,
        ))
    }
}

impl<W, N> MultiSourceSearcher<W, N>
where
    W: SearchBackendTrait,
    N: SearchBackendTrait,
{
    /// Assemble a searcher from explicit backends.
    pub fn new(web: W, news: N, config: &SearchConfig) -> Self {
        Self {
            web,
            news,
            web_limit: config.web_results,
            news_limit: config.news_results,
        }
    }

    /// Query only the web backend, for callers that want a plain listing.
    ///
    /// # Errors
    ///
    /// Propagates the web backend's error.
    pub async fn web_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        self.web.search(query, limit).await
    }

    /// Query both backends concurrently and merge them by host, web first.
    ///
    /// An empty `Ok` list means both backends answered but found nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::AllBackendsFailed`] when the web backend
    /// fails and the news feed contributes no results.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let (web, news) = tokio::join!(
            self.web.search(query, self.web_limit),
            self.news.search(query, self.news_limit),
        );

        let news = news.unwrap_or_else(|e| {
            tracing::warn!(backend = %self.news.backend_type(), error = %e, "news search degraded to empty");
            Vec::new()
        });

        let web = match web {
            Ok(results) => results,
            Err(e) if news.is_empty() => {
                tracing::warn!(backend = %self.web.backend_type(), error = %e, "web search failed");
                return Err(SearchError::AllBackendsFailed(format!(
                    "{}: {e}",
                    self.web.backend_type()
                )));
            }
            Err(e) => {
                tracing::warn!(backend = %self.web.backend_type(), error = %e, "web search failed, using news only");
                Vec::new()
            }
        };

        let (web_count, news_count) = (web.len(), news.len());
        let merged = merge_by_host(web, news);
        tracing::debug!(web_count, news_count, merged = merged.len(), "search merged");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchBackend;
    use std::time::Duration;
    use tokio::time::Instant;

    struct FakeBackend {
        backend: SearchBackend,
        urls: Vec<&'static str>,
        fail: bool,
        delay: Duration,
    }

    impl FakeBackend {
        fn ok(backend: SearchBackend, urls: Vec<&'static str>) -> Self {
            Self {
                backend,
                urls,
                fail: false,
                delay: Duration::ZERO,
            }
        }

        fn failing(backend: SearchBackend) -> Self {
            Self {
                backend,
                urls: Vec::new(),
                fail: true,
                delay: Duration::ZERO,
            }
        }
    }

    impl SearchBackendTrait for FakeBackend {
        async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(SearchError::Http("status 503".into()));
            }
            Ok(self
                .urls
                .iter()
                .take(limit)
                .map(|u| SearchResult {
                    title: format!("{} {u}", self.backend),
                    url: (*u).to_owned(),
                    snippet: String::new(),
                    date: None,
                    source: String::new(),
                })
                .collect())
        }

        fn backend_type(&self) -> SearchBackend {
            self.backend
        }
    }

    fn searcher(web: FakeBackend, news: FakeBackend) -> MultiSourceSearcher<FakeBackend, FakeBackend> {
        MultiSourceSearcher::new(web, news, &SearchConfig::default())
    }

    #[tokio::test]
    async fn merges_web_before_news() {
        let s = searcher(
            FakeBackend::ok(SearchBackend::DuckDuckGo, vec!["https://a.com/1", "https://b.com/1"]),
            FakeBackend::ok(SearchBackend::GoogleNews, vec!["https://b.com/n", "https://c.com/n"]),
        );
        let results = s.search("q").await.expect("search");
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://a.com/1", "https://b.com/1", "https://c.com/n"]);
    }

    #[tokio::test]
    async fn news_failure_degrades_to_web_only() {
        let s = searcher(
            FakeBackend::ok(SearchBackend::DuckDuckGo, vec!["https://a.com/1"]),
            FakeBackend::failing(SearchBackend::GoogleNews),
        );
        let results = s.search("q").await.expect("search");
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn web_failure_with_news_results_uses_news() {
        let s = searcher(
            FakeBackend::failing(SearchBackend::DuckDuckGo),
            FakeBackend::ok(SearchBackend::GoogleNews, vec!["https://n.com/1"]),
        );
        let results = s.search("q").await.expect("search");
        assert_eq!(results[0].url, "https://n.com/1");
    }

    #[tokio::test]
    async fn both_failing_is_all_backends_failed() {
        let s = searcher(
            FakeBackend::failing(SearchBackend::DuckDuckGo),
            FakeBackend::failing(SearchBackend::GoogleNews),
        );
        let err = s.search("q").await.unwrap_err();
        assert!(matches!(err, SearchError::AllBackendsFailed(_)));
        assert!(err.to_string().contains("DuckDuckGo"));
    }

    #[tokio::test]
    async fn nothing_found_is_empty_ok() {
        let s = searcher(
            FakeBackend::ok(SearchBackend::DuckDuckGo, vec![]),
            FakeBackend::ok(SearchBackend::GoogleNews, vec![]),
        );
        assert!(s.search("q").await.expect("search").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn backends_run_concurrently() {
        let mut web = FakeBackend::ok(SearchBackend::DuckDuckGo, vec!["https://a.com/"]);
        web.delay = Duration::from_secs(2);
        let mut news = FakeBackend::ok(SearchBackend::GoogleNews, vec!["https://b.com/"]);
        news.delay = Duration::from_secs(2);
        let s = searcher(web, news);

        let start = Instant::now();
        s.search("q").await.expect("search");
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn limits_come_from_config() {
        let config = SearchConfig {
            web_results: 1,
            news_results: 1,
            ..Default::default()
        };
        let s = MultiSourceSearcher::new(
            FakeBackend::ok(SearchBackend::DuckDuckGo, vec!["https://a.com/", "https://b.com/"]),
            FakeBackend::ok(SearchBackend::GoogleNews, vec!["https://c.com/", "https://d.com/"]),
            &config,
        );
        assert_eq!(s.search("q").await.expect("search").len(), 2);
        assert_eq!(s.web_search("q", 2).await.expect("web").len(), 2);
    }
}
