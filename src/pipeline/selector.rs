//! LLM-driven choice of which candidates to scrape.
//!
//! The model sees a numbered listing and is asked for the indices of the
//! best pages. Its reply is untrusted text: [`parse_selection`] turns it into
//! a bounded list of valid indices, falling back to the first few
//! candidates when nothing usable comes back.

use intel_search::SearchResult;

use crate::llm::LanguageModel;

use super::PromptStyle;

/// Most pages ever scraped for one answer.
pub const MAX_PICKS: usize = 5;

/// Pages taken from the top of the list when the model's reply is unusable.
pub const FALLBACK_PICKS: usize = 4;

/// Token budget for the selection call.
pub const SELECT_MAX_TOKENS: u32 = 64;

const SELECT_SYSTEM: &str = "You select URLs. Reply with comma-separated numbers only.";

/// Render the numbered candidate listing shown to the model.
///
/// The rich style adds the snippet and the publish date when present.
pub fn build_listing(candidates: &[SearchResult], style: PromptStyle) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut line = format!("[{i}] {} | {}", r.title, r.url);
            if style == PromptStyle::Rich {
                if !r.snippet.is_empty() {
                    line.push_str(" | ");
                    line.push_str(&r.snippet);
                }
                if let Some(date) = r.date.as_deref().filter(|d| !d.is_empty()) {
                    line.push_str(" | ");
                    line.push_str(date);
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user prompt for the selection call.
pub fn selection_prompt(query: &str, listing: &str, style: PromptStyle) -> String {
    match style {
        PromptStyle::Rich => format!(
            "You are a research assistant. The user asked: \"{query}\"\n\n\
             Here are search results:\n{listing}\n\n\
             Pick the 3-5 BEST URLs to scrape for answering the question. \
             Choose pages most likely to contain actual data, facts, and details \
             (not homepages or paywalled sites). \
             Reply with ONLY the numbers, comma-separated. Example: 0,2,4,7\n\
             Numbers only, nothing else."
        ),
        PromptStyle::Compressed => format!(
            "User asked: \"{query}\"\n\nSearch results:\n{listing}\n\n\
             Pick 3-5 best URLs for real data (not homepages/paywalls). \
             Reply numbers only, comma-separated."
        ),
    }
}

/// Turn a free-text reply into candidate indices.
///
/// Every run of ASCII digits is read as an index. Out-of-range and repeated
/// indices are dropped (first occurrence kept) and at most [`MAX_PICKS`]
/// remain. If nothing valid is found, the first
/// `min(FALLBACK_PICKS, candidate_count)` indices are returned.
pub fn parse_selection(reply: &str, candidate_count: usize) -> Vec<usize> {
    let mut picks: Vec<usize> = Vec::with_capacity(MAX_PICKS);
    let numbers = reply
        .split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<usize>().ok());

    for index in numbers {
        if index < candidate_count && !picks.contains(&index) {
            picks.push(index);
            if picks.len() == MAX_PICKS {
                break;
            }
        }
    }

    if picks.is_empty() {
        picks.extend(0..candidate_count.min(FALLBACK_PICKS));
    }
    picks
}

/// Ask the model which candidates to scrape.
///
/// A failed model call is treated like an unusable reply: the fallback
/// selection is used and the failure is logged.
pub async fn select(
    llm: &dyn LanguageModel,
    query: &str,
    candidates: &[SearchResult],
    style: PromptStyle,
) -> Vec<usize> {
    let listing = build_listing(candidates, style);
    let prompt = selection_prompt(query, &listing, style);

    let reply = match llm.complete(SELECT_SYSTEM, &prompt, SELECT_MAX_TOKENS).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "page selection call failed, using fallback");
            String::new()
        }
    };

    let picks = parse_selection(&reply, candidates.len());
    tracing::debug!(reply = %reply, ?picks, "pages selected");
    picks
}
