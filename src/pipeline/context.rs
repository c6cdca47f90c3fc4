//! Assembly of the synthesis prompt payload.
//!
//! The order is fixed: the optional live-price line, then a digest of the
//! leading candidates, then one labelled block per usable scraped page in
//! selection order. Failed or near-empty scrapes are left out.

use intel_search::{ScrapeOutcome, SearchResult};

use super::PromptStyle;

/// Candidates included in the snippet digest.
pub const DIGEST_CANDIDATES: usize = 10;

/// Characters of each scraped page kept in the rich context.
pub const RICH_EXCERPT_CHARS: usize = 3000;

/// Characters of each scraped page kept in the compressed context.
pub const COMPRESSED_EXCERPT_CHARS: usize = 2500;

/// The assembled context and how many scraped blocks it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Prompt payload handed to synthesis.
    pub text: String,
    /// Number of scraped page blocks included.
    pub scraped_blocks: usize,
}

/// `- title: snippet` lines for the first [`DIGEST_CANDIDATES`] candidates.
pub fn snippet_digest(candidates: &[SearchResult]) -> String {
    candidates
        .iter()
        .take(DIGEST_CANDIDATES)
        .map(|r| format!("- {}: {}", r.title, r.snippet_or_date()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the context for synthesis.
///
/// `picks` are candidate indices in selection order and `outcomes` holds
/// one scrape outcome per pick, at the same position. `price_line` only
/// applies to the rich style; compressed facts get their price prefix
/// after synthesis.
pub fn assemble(
    style: PromptStyle,
    query: &str,
    price_line: Option<&str>,
    candidates: &[SearchResult],
    picks: &[usize],
    outcomes: &[ScrapeOutcome],
) -> Context {
    let mut scraped = String::new();
    let mut scraped_blocks = 0;

    for (&index, outcome) in picks.iter().zip(outcomes) {
        let Some(text) = outcome.usable_text() else {
            continue;
        };
        let title = candidates.get(index).map_or("", |r| r.title.as_str());
        let url = outcome.url();
        match style {
            PromptStyle::Rich => {
                let excerpt = excerpt(text, RICH_EXCERPT_CHARS);
                scraped.push_str(&format!("\n--- [{title}] {url} ---\n{excerpt}\n"));
            }
            PromptStyle::Compressed => {
                let excerpt = excerpt(text, COMPRESSED_EXCERPT_CHARS);
                scraped.push_str(&format!("\n[{title}] ({url})\n{excerpt}\n"));
            }
        }
        scraped_blocks += 1;
    }

    let digest = snippet_digest(candidates);
    let mut text = match style {
        PromptStyle::Rich => format!(
            "{}Search results summary:\n{digest}",
            price_line.unwrap_or_default()
        ),
        PromptStyle::Compressed => format!("Question: {query}\n\nSearch headlines:\n{digest}"),
    };

    if !scraped.is_empty() {
        let heading = match style {
            PromptStyle::Rich => "Scraped page content:",
            PromptStyle::Compressed => "Scraped pages:",
        };
        text.push_str("\n\n");
        text.push_str(heading);
        text.push_str(&scraped);
    }

    Context {
        text,
        scraped_blocks,
    }
}

fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
