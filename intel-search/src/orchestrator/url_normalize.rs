//! Host extraction for result deduplication.
//!
//! Candidates are deduplicated by network host rather than by full URL, so
//! two articles on the same site collapse to the first one seen.

use url::Url;

/// Returns true if `raw` uses a scheme the pipeline can fetch.
pub fn has_web_scheme(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

/// The deduplication key for a URL: lowercase host plus any explicit port.
///
/// Returns `None` for non-web URLs. When the URL does not parse, the
/// authority segment between the second and third slash is used verbatim.
///
/// # Examples
///
/// ```
/// use intel_search::orchestrator::url_normalize::host_key;
///
/// assert_eq!(host_key("https://News.Example.com/a?b=1").as_deref(), Some("news.example.com"));
/// assert_eq!(host_key("http://localhost:8080/").as_deref(), Some("localhost:8080"));
/// assert_eq!(host_key("mailto:someone@example.com"), None);
/// ```
pub fn host_key(raw: &str) -> Option<String> {
    if !has_web_scheme(raw) {
        return None;
    }

    if let Ok(parsed) = Url::parse(raw) {
        if let Some(host) = parsed.host_str() {
            return Some(match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            });
        }
    }

    raw.split('/')
        .nth(2)
        .filter(|authority| !authority.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Host name shown as a source label; falls back to the raw URL.
pub fn display_host(raw: &str) -> String {
    host_key(raw).unwrap_or_else(|| raw.to_owned())
}
