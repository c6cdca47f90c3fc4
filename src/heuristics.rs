//! Keyword classifiers over the lower-cased query.
//!
//! These are plain substring checks, not models: they decide whether a
//! live price is worth fetching and how the synthesis prompt is worded.

/// Phrases that mark a question about current events.
const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "latest",
    "recent",
    "today",
    "breaking",
    "headlines",
    "happened",
    "update",
    "current events",
    "this week",
    "this month",
    "what's going on",
    "whats going on",
    "what is happening",
];

/// Words that make a facts query worth a live price prefix.
const PRICE_KEYWORDS: &[&str] = &["price", "btc", "bitcoin", "eth", "ethereum", "sol", "solana"];

/// Coin used when a price-related query names no specific coin.
pub const DEFAULT_COIN: &str = "bitcoin";

/// Which endpoint is asking; `/ask` also fires on the word "crypto".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTrigger {
    /// The rich `/ask` pipeline.
    Answer,
    /// The compressed `/api/intel` search mode.
    Facts,
}

/// Returns true if the query looks like a current-events question.
pub fn is_news_query(query: &str) -> bool {
    let q = query.to_lowercase();
    NEWS_KEYWORDS.iter().any(|w| q.contains(w))
}

/// Returns true if the query is about a cryptocurrency price.
pub fn is_crypto_query(query: &str, trigger: PriceTrigger) -> bool {
    let q = query.to_lowercase();
    PRICE_KEYWORDS.iter().any(|w| q.contains(w))
        || (trigger == PriceTrigger::Answer && q.contains("crypto"))
}

/// Pick the coin a price-related query is about.
///
/// `eth`/`ethereum` wins over `sol`/`solana`, which wins over the
/// bitcoin default.
pub fn coin_for_query(query: &str) -> &'static str {
    let q = query.to_lowercase();
    if q.contains("eth") || q.contains("ethereum") {
        "ethereum"
    } else if q.contains("sol") || q.contains("solana") {
        "solana"
    } else {
        DEFAULT_COIN
    }
}

/// The coin to quote when the caller asked for a price directly.
///
/// Same precedence as [`coin_for_query`], with `btc`/`bit` mapping to
/// bitcoin; anything else is passed through as a coin id. An empty query
/// means bitcoin.
pub fn coin_for_price_request(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return DEFAULT_COIN.to_owned();
    }
    let q = trimmed.to_lowercase();
    if q.contains("eth") {
        "ethereum".to_owned()
    } else if q.contains("sol") {
        "solana".to_owned()
    } else if q.contains("btc") || q.contains("bit") {
        DEFAULT_COIN.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// The coin to prefix a live price for, if the query warrants one.
pub fn price_coin(query: &str, trigger: PriceTrigger) -> Option<&'static str> {
    is_crypto_query(query, trigger).then(|| coin_for_query(query))
}
