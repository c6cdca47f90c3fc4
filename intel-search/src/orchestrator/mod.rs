//! Search orchestration: concurrent backend fan-out and host-based merge.

pub mod dedup;
pub mod search;
pub mod url_normalize;

pub use dedup::merge_by_host;
pub use search::MultiSourceSearcher;
