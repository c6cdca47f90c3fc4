//! Intel gateway: web search, page selection, scraping and LLM synthesis
//! behind a small HTTP API.
//!
//! A question flows through a fixed pipeline:
//! search (web + news, concurrently) → merge by host → LLM page selection →
//! parallel scraping on a bounded worker pool → context assembly → one
//! synthesis call → optional byte-budget truncation.
//!
//! # Architecture
//!
//! - **Search and scraping** live in the `intel-search` crate
//! - **LLM and price clients** sit behind the [`LanguageModel`] and
//!   [`PriceSource`] traits so tests can script them
//! - **Pipeline** ([`pipeline::Pipeline`]) owns the sequencing and the
//!   degradation policy
//! - **Server** ([`server::GatewayServer`]) maps HTTP requests onto the
//!   pipeline and records an activity log

pub mod activity;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod llm;
pub mod pipeline;
pub mod price;
pub mod server;

pub use activity::{ActivityEntry, ActivityLog, ActivityStatus};
pub use config::GatewayConfig;
pub use error::{GatewayError, LlmError, PriceError, Result};
pub use llm::{ChatCompletionsClient, LanguageModel};
pub use pipeline::{AskAnswer, IntelFacts, Pipeline, PromptStyle};
pub use price::{CoinGeckoClient, CoinQuote, PriceSource};
pub use server::{AppState, GatewayServer};
