//! The blocking page-fetch primitive.
//!
//! [`PageFetcher`] is the opaque "fetch(url) -> document" capability the rest
//! of the crate builds on. It is deliberately synchronous: implementations
//! may drive a headless browser or another blocking stack, and callers run
//! them on the [`BlockingPool`](crate::executor::BlockingPool) so they never
//! stall the async scheduler.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;

/// Fetch a page and return its HTML body.
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// concurrent request.
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, blocking the current thread until the body is read.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] for transport failures and non-success
    /// statuses, [`SearchError::Timeout`] when the configured timeout elapses.
    fn fetch(&self, url: &str) -> Result<String, SearchError>;
}

/// Plain-HTTP [`PageFetcher`] backed by a blocking `ureq` agent.
///
/// Sends browser-like headers and rotates the User-Agent on every request
/// unless a custom one is configured.
pub struct HttpPageFetcher {
    agent: ureq::Agent,
    user_agent: Option<String>,
}

impl HttpPageFetcher {
    /// Create a fetcher from the search configuration.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            agent: http::build_blocking_agent(config),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Result<String, SearchError> {
        let ua = self
            .user_agent
            .as_deref()
            .unwrap_or_else(|| http::random_user_agent());

        let response = self
            .agent
            .get(url)
            .set("User-Agent", ua)
            .set("Accept", http::ACCEPT_HTML)
            .set("Accept-Language", http::ACCEPT_LANGUAGE)
            .call()
            .map_err(map_ureq_error)?;

        let body = response
            .into_string()
            .map_err(|e| SearchError::Http(format!("response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "page fetched");
        Ok(body)
    }
}

fn map_ureq_error(err: ureq::Error) -> SearchError {
    match err {
        ureq::Error::Status(code, _) => SearchError::Http(format!("status {code}")),
        ureq::Error::Transport(t) => {
            let message = t.to_string();
            if message.contains("timed out") {
                SearchError::Timeout(message)
            } else {
                SearchError::Http(message)
            }
        }
    }
}
