//! Error types for the intel gateway.

use intel_search::SearchError;

/// Top-level error type for the gateway service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Search or scrape error from the search crate.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Language model call failed.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Price lookup failed.
    #[error("price error: {0}")]
    Price(#[from] PriceError),

    /// A single requested page could not be read.
    #[error("scrape failed: {0}")]
    ScrapeFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server setup error.
    #[error("server error: {0}")]
    Server(String),
}

/// Errors from the chat-completions client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The provider rejected the API key.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the configured timeout.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Non-success status or malformed body from the provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// The response carried no message content.
    #[error("response contained no message content")]
    EmptyResponse,
}

/// Errors from the price API client.
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    /// The request could not be sent or timed out.
    #[error("price request failed: {0}")]
    Request(String),

    /// The price API answered with a non-success status.
    #[error("price API returned HTTP {0}")]
    Http(u16),

    /// The response body was not the expected JSON.
    #[error("invalid price response: {0}")]
    Decode(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GatewayError>;
