//! The answer pipeline behind `/ask` and `/api/intel`.
//!
//! ```text
//! query ─┬─ web search ─┐
//!        └─ news feed  ─┴─ merge by host ─ select (LLM) ─ scrape (pool) ─ assemble ─ synthesize (LLM)
//! ```
//!
//! The steps after the merge are strictly sequential. Optional enrichment
//! (news feed, live price) degrades locally; search and synthesis failures
//! propagate to the caller.

pub mod context;
pub mod selector;
pub mod synth;
pub mod truncate;

use std::sync::Arc;

use intel_search::engines::{DuckDuckGoEngine, GoogleNewsEngine};
use intel_search::{
    display_host, MultiSourceSearcher, ParallelScraper, SearchBackendTrait, SearchResult,
};

use crate::error::{GatewayError, Result};
use crate::heuristics::{coin_for_price_request, is_news_query, price_coin, PriceTrigger};
use crate::llm::LanguageModel;
use crate::price::{CoinQuote, PriceSource, PRICE_SOURCE_HOST};
use truncate::truncate_utf8;

/// Results listed by the plain `/search` endpoint.
pub const LISTING_RESULTS: usize = 8;

/// How prompts and context are worded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Free-text answers for people (`/ask`).
    Rich,
    /// Dense fact strings for machines (`/api/intel`).
    Compressed,
}

/// Result of `/ask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskAnswer {
    /// Search found nothing; the answer explains that.
    NoResults {
        /// Optional live price line followed by the "no results" message.
        answer: String,
    },
    /// The model answered from scraped pages.
    Answered {
        /// Model output.
        answer: String,
        /// URLs chosen for scraping, in selection order.
        sources: Vec<String>,
    },
}

/// A compressed facts string and the hosts it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntelFacts {
    /// Facts, at most the requested byte budget for search and browse.
    pub facts: String,
    /// Source hosts, price source first when a price was included.
    pub sources: Vec<String>,
    /// Pages that yielded usable text.
    pub scraped: usize,
}

/// Search, select, scrape and synthesize.
pub struct Pipeline<W = DuckDuckGoEngine, N = GoogleNewsEngine> {
    searcher: MultiSourceSearcher<W, N>,
    scraper: ParallelScraper,
    llm: Arc<dyn LanguageModel>,
    prices: Arc<dyn PriceSource>,
}

impl<W, N> Pipeline<W, N>
where
    W: SearchBackendTrait,
    N: SearchBackendTrait,
{
    /// Wire the pipeline from its collaborators.
    pub fn new(
        searcher: MultiSourceSearcher<W, N>,
        scraper: ParallelScraper,
        llm: Arc<dyn LanguageModel>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            searcher,
            scraper,
            llm,
            prices,
        }
    }

    /// Answer a question in free text with cited sources.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Search`] when search fails outright and
    /// [`GatewayError::Llm`] when synthesis fails.
    pub async fn ask(&self, query: &str) -> Result<AskAnswer> {
        let coin = price_coin(query, PriceTrigger::Answer);
        let (quote, candidates) = tokio::join!(self.optional_quote(coin), self.searcher.search(query));
        let price_line = quote.map(|q| q.live_data_line()).unwrap_or_default();
        let candidates = candidates?;

        if candidates.is_empty() {
            return Ok(AskAnswer::NoResults {
                answer: format!("{price_line}No search results found for: {query}"),
            });
        }

        let (picks, urls, outcomes) = self.select_and_scrape(query, &candidates, PromptStyle::Rich).await;
        let ctx = context::assemble(
            PromptStyle::Rich,
            query,
            Some(price_line.as_str()),
            &candidates,
            &picks,
            &outcomes,
        );
        tracing::debug!(scraped = ctx.scraped_blocks, bytes = ctx.text.len(), "context assembled");

        let answer = synth::answer(self.llm.as_ref(), query, &ctx.text, is_news_query(query)).await?;
        Ok(AskAnswer::Answered {
            answer,
            sources: urls,
        })
    }

    /// Compressed facts for a search query, at most `max_bytes` long.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Search`] when search fails outright and
    /// [`GatewayError::Llm`] when synthesis fails.
    pub async fn intel_search(&self, query: &str, max_bytes: usize) -> Result<IntelFacts> {
        let coin = price_coin(query, PriceTrigger::Facts);
        let (quote, candidates) = tokio::join!(self.optional_quote(coin), self.searcher.search(query));
        let candidates = candidates?;

        if candidates.is_empty() {
            let notice = format!("No results found for: {query}");
            return Ok(IntelFacts {
                facts: truncate_utf8(&notice, max_bytes).to_owned(),
                sources: Vec::new(),
                scraped: 0,
            });
        }

        let prefix = quote
            .as_ref()
            .map(|q| format!("{} | ", q.facts_line()))
            .unwrap_or_default();

        let (picks, urls, outcomes) =
            self.select_and_scrape(query, &candidates, PromptStyle::Compressed).await;
        let ctx = context::assemble(
            PromptStyle::Compressed,
            query,
            None,
            &candidates,
            &picks,
            &outcomes,
        );

        let facts = synth::compressed_facts(self.llm.as_ref(), &ctx.text, &prefix, max_bytes).await?;

        let mut sources = Vec::with_capacity(urls.len() + 1);
        if quote.is_some() {
            sources.push(PRICE_SOURCE_HOST.to_owned());
        }
        sources.extend(urls.iter().map(|u| display_host(u)));

        Ok(IntelFacts {
            facts,
            sources,
            scraped: ctx.scraped_blocks,
        })
    }

    /// Compressed facts for a single page, at most `max_bytes` long.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ScrapeFailed`] when the page cannot be read
    /// or yields no text, and [`GatewayError::Llm`] when synthesis fails.
    pub async fn intel_browse(&self, url: &str, max_bytes: usize) -> Result<IntelFacts> {
        let text = self
            .scraper
            .scrape_one(url)
            .await
            .map_err(|e| GatewayError::ScrapeFailed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(GatewayError::ScrapeFailed("no readable text".into()));
        }

        let facts = synth::page_facts(self.llm.as_ref(), url, &text, max_bytes).await?;
        Ok(IntelFacts {
            facts,
            sources: vec![display_host(url)],
            scraped: 1,
        })
    }

    /// A one-line price fact for a coin named in `query`, at most
    /// `max_bytes` long.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Price`] when the price lookup fails.
    pub async fn intel_price(&self, query: &str, max_bytes: usize) -> Result<(String, IntelFacts)> {
        let coin = coin_for_price_request(query);
        let line = match self.prices.quote(&coin).await? {
            Some(quote) => quote.facts_line(),
            None => format!("Price not found for: {coin}"),
        };
        let facts = truncate_utf8(&line, max_bytes).to_owned();
        Ok((
            coin,
            IntelFacts {
                facts,
                sources: vec![PRICE_SOURCE_HOST.to_owned()],
                scraped: 0,
            },
        ))
    }

    /// Quote `coin` directly. `None` means the coin is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Price`] when the lookup fails.
    pub async fn quote(&self, coin: &str) -> Result<Option<CoinQuote>> {
        Ok(self.prices.quote(coin).await?)
    }

    /// Plain web results for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Search`] when the web backend fails.
    pub async fn web_results(&self, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.searcher.web_search(query, LISTING_RESULTS).await?)
    }

    /// Briefing over a result listing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Llm`] when the model call fails.
    pub async fn summarize(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        Ok(synth::summarize_results(self.llm.as_ref(), query, results).await?)
    }

    /// Readable text of one page.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Search`] when the fetch fails.
    pub async fn read_page(&self, url: &str) -> Result<String> {
        Ok(self.scraper.scrape_one(url).await?)
    }

    /// Key information from one page's text.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Llm`] when the model call fails.
    pub async fn extract(&self, url: &str, text: &str) -> Result<String> {
        Ok(synth::extract_page(self.llm.as_ref(), url, text).await?)
    }

    async fn optional_quote(&self, coin: Option<&str>) -> Option<CoinQuote> {
        let coin = coin?;
        match self.prices.quote(coin).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(coin, error = %e, "live price skipped");
                None
            }
        }
    }

    async fn select_and_scrape(
        &self,
        query: &str,
        candidates: &[SearchResult],
        style: PromptStyle,
    ) -> (Vec<usize>, Vec<String>, Vec<intel_search::ScrapeOutcome>) {
        let picks = selector::select(self.llm.as_ref(), query, candidates, style).await;
        let urls: Vec<String> = picks.iter().map(|&i| candidates[i].url.clone()).collect();
        let outcomes = self.scraper.scrape_all(&urls).await;
        (picks, urls, outcomes)
    }
}

impl<W, N> std::fmt::Debug for Pipeline<W, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("scraper", &self.scraper)
            .finish_non_exhaustive()
    }
}
