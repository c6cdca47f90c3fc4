//! Parallel, failure-tolerant page scraping.
//!
//! [`ParallelScraper`] fetches a batch of pages through the shared
//! [`BlockingPool`] and extracts their readable text. Every input URL yields
//! exactly one [`ScrapeOutcome`] at the same position; a failing page becomes
//! [`ScrapeOutcome::Failed`] and never aborts the rest of the batch.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::config::SearchConfig;
use crate::content::extract_fragments;
use crate::error::SearchError;
use crate::executor::BlockingPool;
use crate::fetch::PageFetcher;
use crate::types::ScrapeOutcome;

/// Longest failure reason kept on a [`ScrapeOutcome::Failed`].
const MAX_REASON_CHARS: usize = 200;

/// Scrapes pages concurrently, bounded by the worker pool.
#[derive(Clone)]
pub struct ParallelScraper {
    fetcher: Arc<dyn PageFetcher>,
    pool: BlockingPool,
    timeout: Duration,
    max_chars: usize,
}

impl ParallelScraper {
    /// Create a scraper sharing `fetcher` and `pool` with the rest of the
    /// process.
    pub fn new(fetcher: Arc<dyn PageFetcher>, pool: BlockingPool, config: &SearchConfig) -> Self {
        Self {
            fetcher,
            pool,
            timeout: Duration::from_secs(config.fetch_timeout_seconds),
            max_chars: config.scrape_max_chars,
        }
    }

    /// Fetch one page and return its extracted text.
    ///
    /// Fetching and extraction both run on the worker pool.
    ///
    /// # Errors
    ///
    /// Returns whatever the fetcher reports, [`SearchError::Timeout`] when
    /// the pool slot or fetch exceeds the timeout, and
    /// [`SearchError::Worker`] when the fetcher panics.
    pub async fn scrape_one(&self, url: &str) -> Result<String, SearchError> {
        let fetcher = Arc::clone(&self.fetcher);
        let max_chars = self.max_chars;
        let target = url.to_owned();
        self.pool
            .run(self.timeout, move || {
                fetcher
                    .fetch(&target)
                    .map(|html| extract_fragments(&html, max_chars))
            })
            .await?
    }

    /// Scrape every URL concurrently. The output has one outcome per input
    /// URL, in input order, whatever order the fetches complete in.
    pub async fn scrape_all(&self, urls: &[String]) -> Vec<ScrapeOutcome> {
        let jobs = urls.iter().map(|url| async move {
            match self.scrape_one(url).await {
                Ok(text) => ScrapeOutcome::Scraped {
                    url: url.clone(),
                    text,
                },
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "scrape failed");
                    ScrapeOutcome::Failed {
                        url: url.clone(),
                        reason: e.to_string().chars().take(MAX_REASON_CHARS).collect(),
                    }
                }
            }
        });
        let outcomes = join_all(jobs).await;

        tracing::debug!(
            requested = urls.len(),
            failed = outcomes.iter().filter(|o| o.is_failed()).count(),
            "scrape batch finished"
        );
        outcomes
    }
}

impl std::fmt::Debug for ParallelScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelScraper")
            .field("pool", &self.pool)
            .field("timeout", &self.timeout)
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}
