//! Core types for search results, backend identification, and scrape outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of characters a scrape must yield to be worth feeding to
/// an LLM. Anything at or below this is treated as a failed page.
pub const MIN_USABLE_CHARS: usize = 50;

/// A single discovered web resource, normalised across backends.
///
/// Web results carry a `snippet`; news results carry a publish `date`.
/// Either may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the result page or headline.
    pub title: String,
    /// Destination URL, with any redirect wrapper removed.
    pub url: String,
    /// Text snippet shown by the search backend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snippet: String,
    /// Publish date as reported by a news feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Displayed source (domain or publisher name).
    #[serde(default)]
    pub source: String,
}

impl SearchResult {
    /// Snippet if present, otherwise the publish date, otherwise empty.
    pub fn snippet_or_date(&self) -> &str {
        if !self.snippet.is_empty() {
            &self.snippet
        } else {
            self.date.as_deref().unwrap_or("")
        }
    }
}

/// The search backends queried for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchBackend {
    /// DuckDuckGo HTML results, fetched through the page fetcher.
    DuckDuckGo,
    /// Google News RSS feed, fetched over plain HTTP.
    GoogleNews,
}

impl SearchBackend {
    /// Returns the human-readable name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "DuckDuckGo",
            Self::GoogleNews => "GoogleNews",
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened when one selected page was scraped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Extracted readable text (possibly empty).
    Scraped {
        /// The page that was fetched.
        url: String,
        /// Extracted text, already capped.
        text: String,
    },
    /// The fetch or extraction failed; the batch carried on.
    Failed {
        /// The page that was attempted.
        url: String,
        /// Short reason for logs.
        reason: String,
    },
}

impl ScrapeOutcome {
    /// The URL this outcome belongs to.
    pub fn url(&self) -> &str {
        match self {
            Self::Scraped { url, .. } | Self::Failed { url, .. } => url,
        }
    }

    /// Text worth passing on: only successful scrapes longer than
    /// [`MIN_USABLE_CHARS`] characters.
    pub fn usable_text(&self) -> Option<&str> {
        match self {
            Self::Scraped { text, .. } if text.chars().count() > MIN_USABLE_CHARS => Some(text),
            _ => None,
        }
    }

    /// Whether this outcome is a failure marker.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
