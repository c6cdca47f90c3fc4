//! Error types for the intel-search crate.
//!
//! All errors use stable string messages suitable for logs and for the short
//! machine-readable reasons the gateway returns. No query text beyond what the
//! caller supplied and no credentials appear in error messages.

/// Errors that can occur during search, fetch, or scrape operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every search backend failed to return results.
    #[error("all search backends failed: {0}")]
    AllBackendsFailed(String),

    /// An operation exceeded its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// An HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A job on the blocking worker pool panicked or was cancelled.
    #[error("worker error: {0}")]
    Worker(String),
}

/// Convenience type alias for intel-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
