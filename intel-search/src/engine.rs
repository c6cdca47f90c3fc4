//! Trait definition for pluggable search backends.
//!
//! Each backend (DuckDuckGo HTML, Google News RSS) implements
//! [`SearchBackendTrait`] to provide a uniform interface for querying and
//! parsing results.

use crate::error::SearchError;
use crate::types::{SearchBackend, SearchResult};

/// A pluggable search backend.
///
/// Implementors handle their own:
///
/// - URL construction with query encoding
/// - transport (page fetcher on the worker pool, or async HTTP)
/// - parsing into [`SearchResult`] values
///
/// All implementations must be `Send + Sync` so both backends can be queried
/// concurrently from one request.
pub trait SearchBackendTrait: Send + Sync {
    /// Perform a search and return at most `limit` parsed results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, times out, or the
    /// response cannot be parsed.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Returns which [`SearchBackend`] variant this implementation represents.
    fn backend_type(&self) -> SearchBackend;
}
