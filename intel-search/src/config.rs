//! Search and scrape configuration with sensible defaults.
//!
//! [`SearchConfig`] controls backend endpoints, per-backend result limits,
//! timeouts, and the size of the blocking worker pool. The defaults match the
//! gateway's production behaviour.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration shared by the searcher and the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// DuckDuckGo HTML endpoint. The query is appended as `?q=`.
    pub web_search_url: String,
    /// Google News RSS search endpoint. The query is appended as `?q=`.
    pub news_feed_url: String,
    /// Maximum web results to collect per query.
    pub web_results: usize,
    /// Maximum news entries to collect per query.
    pub news_results: usize,
    /// Timeout for the news feed request in seconds.
    pub feed_timeout_seconds: u64,
    /// Timeout for a single page fetch (search page or scrape) in seconds.
    pub fetch_timeout_seconds: u64,
    /// Number of concurrent blocking fetches allowed process-wide.
    pub scrape_workers: usize,
    /// Maximum characters of extracted text kept per scraped page.
    pub scrape_max_chars: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            web_search_url: "https://html.duckduckgo.com/html/".to_owned(),
            news_feed_url: "https://news.google.com/rss/search".to_owned(),
            web_results: 10,
            news_results: 8,
            feed_timeout_seconds: 15,
            fetch_timeout_seconds: 30,
            scrape_workers: 4,
            scrape_max_chars: 6000,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - result limits must be greater than 0
    /// - timeouts must be greater than 0
    /// - `scrape_workers` must be greater than 0
    /// - endpoints must be absolute `http(s)` URLs
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.web_results == 0 || self.news_results == 0 {
            return Err(SearchError::Config(
                "web_results and news_results must be greater than 0".into(),
            ));
        }
        if self.feed_timeout_seconds == 0 || self.fetch_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "feed_timeout_seconds and fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.scrape_workers == 0 {
            return Err(SearchError::Config(
                "scrape_workers must be greater than 0".into(),
            ));
        }
        if self.scrape_max_chars == 0 {
            return Err(SearchError::Config(
                "scrape_max_chars must be greater than 0".into(),
            ));
        }
        for (name, endpoint) in [
            ("web_search_url", &self.web_search_url),
            ("news_feed_url", &self.news_feed_url),
        ] {
            match url::Url::parse(endpoint) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => {
                    return Err(SearchError::Config(format!(
                        "{name} must be an absolute http(s) URL"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.web_results, 10);
        assert_eq!(config.news_results, 8);
        assert_eq!(config.feed_timeout_seconds, 15);
        assert_eq!(config.scrape_workers, 4);
        assert_eq!(config.scrape_max_chars, 6000);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_result_limit_rejected() {
        let config = SearchConfig {
            news_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("news_results"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            fetch_timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn zero_workers_rejected() {
        let config = SearchConfig {
            scrape_workers: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scrape_workers"));
    }

    #[test]
    fn relative_endpoint_rejected() {
        let config = SearchConfig {
            news_feed_url: "/rss/search".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("news_feed_url"));
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"scrape_workers": 2}"#).expect("deserialize");
        assert_eq!(config.scrape_workers, 2);
        assert_eq!(config.web_results, 10);
    }
}
