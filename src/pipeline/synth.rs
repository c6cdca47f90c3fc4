//! Final LLM calls: free-text answers and byte-budgeted fact strings.
//!
//! Every function here makes exactly one model call and never goes back to
//! search or scraping.

use intel_search::SearchResult;

use crate::error::LlmError;
use crate::llm::LanguageModel;

use super::truncate::truncate_utf8;

/// Persona for free-text answers.
pub const SYSTEM: &str = "You are a research assistant answering from live web data.\n\
Rules:\n\
- Plain text ONLY. No markdown: no headers, bold, bullets or code blocks.\n\
- Be concise. At most 3-5 sentences per topic.\n\
- Lead with the most important facts.\n\
- Include dates and sources inline.\n\
- If information is stale or unclear, say so.";

/// Persona for dense fact strings.
pub const FACT_SYSTEM: &str = "You extract ONLY meaningful facts from web data. Dense fact list only.\n\
Rules: lead with numbers, dates, names, prices. Cite source domain inline like: BTC $97K (coindesk).\n\
Use | to separate facts. No filler, no analysis, no complete sentences. No markdown.\n\
SKIP all navigation text, cookie notices, consent pages, privacy settings, 'about' sections, \
loading indicators, affiliate disclaimers, and any text that is website UI rather than actual content.\n\
Only include facts that directly answer the query.";

/// Token budget for a rich answer.
pub const ANSWER_MAX_TOKENS: u32 = 1024;
/// Token budget for compressed search facts.
pub const FACTS_MAX_TOKENS: u32 = 768;
/// Token budget for compressed single-page facts.
pub const PAGE_FACTS_MAX_TOKENS: u32 = 512;
/// Token budget for a search-results summary.
pub const SUMMARY_MAX_TOKENS: u32 = 512;
/// Token budget for single-page extraction.
pub const EXTRACT_MAX_TOKENS: u32 = 768;

/// Characters of a page passed to single-page fact extraction.
pub const PAGE_FACTS_INPUT_CHARS: usize = 5000;

/// Answer `query` from an assembled rich context.
///
/// # Errors
///
/// Propagates the model failure; there is no fallback answer.
pub async fn answer(
    llm: &dyn LanguageModel,
    query: &str,
    context: &str,
    news: bool,
) -> Result<String, LlmError> {
    let news_hint = if news {
        " If this is a news query, summarize each major story with key details."
    } else {
        ""
    };
    let prompt = format!(
        "Answer this question using ALL the data below. Be thorough and factual. \
         Include specific facts, numbers, names, dates from the scraped content. \
         Cite which source each fact came from.{news_hint}\n\n\
         Question: {query}\n\n{context}"
    );
    llm.complete(SYSTEM, &prompt, ANSWER_MAX_TOKENS).await
}

/// Compress an assembled search context into facts of at most `max_bytes`.
///
/// `prefix` (a live price line) is prepended before truncation.
///
/// # Errors
///
/// Propagates the model failure.
pub async fn compressed_facts(
    llm: &dyn LanguageModel,
    context: &str,
    prefix: &str,
    max_bytes: usize,
) -> Result<String, LlmError> {
    let prompt = format!(
        "{context}\n\nExtract ONLY facts that answer the question. Skip website UI, \
         navigation, cookie/consent text, loading messages, disclaimers. \
         Budget: {max_bytes} chars."
    );
    let facts = llm.complete(FACT_SYSTEM, &prompt, FACTS_MAX_TOKENS).await?;
    let joined = format!("{prefix}{facts}");
    Ok(truncate_utf8(&joined, max_bytes).to_owned())
}

/// Compress one scraped page into facts of at most `max_bytes`.
///
/// # Errors
///
/// Propagates the model failure.
pub async fn page_facts(
    llm: &dyn LanguageModel,
    url: &str,
    text: &str,
    max_bytes: usize,
) -> Result<String, LlmError> {
    let excerpt = match text.char_indices().nth(PAGE_FACTS_INPUT_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    };
    let prompt = format!(
        "Extract key facts from this page ({url}):\n\n{excerpt}\n\nBudget: {max_bytes} chars."
    );
    let facts = llm.complete(FACT_SYSTEM, &prompt, PAGE_FACTS_MAX_TOKENS).await?;
    Ok(truncate_utf8(&facts, max_bytes).to_owned())
}

/// Brief the caller on a list of search results.
///
/// # Errors
///
/// Propagates the model failure.
pub async fn summarize_results(
    llm: &dyn LanguageModel,
    query: &str,
    results: &[SearchResult],
) -> Result<String, LlmError> {
    let listing = results
        .iter()
        .map(|r| format!("- {}: {}", r.title, r.snippet_or_date()))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = format!(
        "Summarize these search results for: {query}\n\n{listing}\n\n\
         Concise briefing of the top stories/results. Include sources."
    );
    llm.complete(SYSTEM, &prompt, SUMMARY_MAX_TOKENS).await
}

/// Pull the key information out of one page's text.
///
/// # Errors
///
/// Propagates the model failure.
pub async fn extract_page(llm: &dyn LanguageModel, url: &str, text: &str) -> Result<String, LlmError> {
    let prompt = format!(
        "Extract the key information from this page. Skip navigation/ads.\n\n\
         URL: {url}\n\nContent:\n{text}"
    );
    llm.complete(SYSTEM, &prompt, EXTRACT_MAX_TOKENS).await
}
