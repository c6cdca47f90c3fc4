//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchBackendTrait`]
//! together with a pure parse function that can be tested against fixtures.

pub mod duckduckgo;
pub mod google_news;

pub use duckduckgo::DuckDuckGoEngine;
pub use google_news::GoogleNewsEngine;
