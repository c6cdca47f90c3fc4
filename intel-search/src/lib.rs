//! # intel-search
//!
//! Multi-source web search and failure-tolerant page scraping for the intel
//! gateway.
//!
//! This crate knows how to find pages and read them; it knows nothing about
//! LLMs and opens no listeners.
//!
//! ## Design
//!
//! - DuckDuckGo HTML results and Google News RSS are queried concurrently and
//!   merged by network host, web results first
//! - Page fetching is a blocking [`PageFetcher`] run on a process-wide
//!   [`BlockingPool`], so a slow fetch never stalls the async scheduler
//! - [`ParallelScraper`] returns one [`ScrapeOutcome`] per URL in input order;
//!   a failing page never aborts the batch
//! - No caching: every call hits the network once, with no retries
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> intel_search::Result<()> {
//! use std::sync::Arc;
//! use intel_search::{BlockingPool, HttpPageFetcher, MultiSourceSearcher, ParallelScraper, SearchConfig};
//!
//! let config = SearchConfig::default();
//! let fetcher = Arc::new(HttpPageFetcher::new(&config));
//! let pool = BlockingPool::new(config.scrape_workers);
//!
//! let searcher = MultiSourceSearcher::from_config(fetcher.clone(), pool.clone(), &config)?;
//! let candidates = searcher.search("ethereum etf approval").await?;
//!
//! let scraper = ParallelScraper::new(fetcher, pool, &config);
//! let urls: Vec<String> = candidates.iter().take(4).map(|r| r.url.clone()).collect();
//! for outcome in scraper.scrape_all(&urls).await {
//!     println!("{}: {:?}", outcome.url(), outcome.usable_text().map(str::len));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod http;
pub mod orchestrator;
pub mod scrape;
pub mod types;

pub use config::SearchConfig;
pub use content::extract_fragments;
pub use engine::SearchBackendTrait;
pub use error::{Result, SearchError};
pub use executor::BlockingPool;
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use orchestrator::url_normalize::{display_host, host_key};
pub use orchestrator::{merge_by_host, MultiSourceSearcher};
pub use scrape::ParallelScraper;
pub use types::{ScrapeOutcome, SearchBackend, SearchResult, MIN_USABLE_CHARS};
