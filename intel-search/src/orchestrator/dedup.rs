//! Merging of web and news candidates by network host.

use std::collections::HashSet;

use crate::types::SearchResult;

use super::url_normalize::host_key;

/// Merge web and news results into one candidate list.
///
/// `web` entries come first, then `news`; that order is the collision
/// policy, so a news item on a host already seen in `web` is dropped. Within
/// each list the first entry per host wins. Entries whose URL is not
/// `http(s)` are discarded. Order is otherwise preserved, because the index
/// of each candidate is what the page selector sees.
pub fn merge_by_host(web: Vec<SearchResult>, news: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(web.len() + news.len());

    for result in web.into_iter().chain(news) {
        let Some(key) = host_key(&result.url) else {
            continue;
        };
        if seen.insert(key) {
            merged.push(result);
        }
    }

    merged
}
