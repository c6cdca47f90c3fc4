//! HTML content extraction: strips boilerplate and returns readable text.
//!
//! Removes non-content elements (scripts, styles, navigation), collects the
//! text that sits directly inside content-bearing elements, and joins the
//! fragments line by line for LLM consumption.

use scraper::{ElementRef, Html, Selector};

/// Default maximum characters returned per page.
pub const DEFAULT_MAX_CHARS: usize = 6000;

/// Fragments this short (after trimming) are discarded as noise.
const MIN_FRAGMENT_CHARS: usize = 5;

/// Elements removed together with everything inside them.
const BOILERPLATE_TAGS: [&str; 9] = [
    "script", "style", "noscript", "svg", "iframe", "nav", "footer", "header", "aside",
];

/// Elements whose own text nodes are kept.
const CONTENT_SELECTOR: &str = "article, main, .content, p, h1, h2, h3, li, td";

/// Extract readable text from raw HTML, capped at `max_chars` characters.
///
/// Walks every element matching the content selector in document order and
/// takes its direct text children, so nested elements contribute their text
/// once. Falls back to the whole `<body>` text when nothing matches. The
/// result may be empty; callers decide whether a page is usable.
pub fn extract_fragments(html: &str, max_chars: usize) -> String {
    let cleaned_html = strip_boilerplate_tags(html);
    let document = Html::parse_document(&cleaned_html);

    let mut text = collect_fragments(&document).join("\n");
    if text.is_empty() {
        text = body_text(&document);
    }

    truncate_chars(text, max_chars)
}

fn collect_fragments(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(CONTENT_SELECTOR) else {
        return Vec::new();
    };

    let mut fragments = Vec::new();
    for element in document.select(&selector) {
        let own_text = direct_text(element);
        let trimmed = own_text.trim();
        if trimmed.chars().count() > MIN_FRAGMENT_CHARS {
            fragments.push(trimmed.to_owned());
        }
    }
    fragments
}

/// Concatenated text nodes that are immediate children of `element`.
fn direct_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn body_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|body| body.text().collect::<Vec<_>>().join(" "))
        .map(|raw| normalise_whitespace(&raw))
        .filter(|text| text.chars().count() > MIN_FRAGMENT_CHARS)
        .unwrap_or_default()
}

/// Remove boilerplate HTML tags and their content before parsing.
fn strip_boilerplate_tags(html: &str) -> String {
    let mut result = html.to_owned();
    for tag in &BOILERPLATE_TAGS {
        result = strip_tag(&result, tag);
    }
    result
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // `<nav` must not match `<navigate>`.
        let after_tag = start + open_tag.len();
        if let Some(&next_byte) = lower.as_bytes().get(after_tag) {
            if !matches!(next_byte, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t') {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        pos = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => match lower[start..].find('>') {
                Some(offset) => start + offset + 1,
                None => html.len(),
            },
        };
    }

    result
}

/// Collapse every whitespace run to a single space.
fn normalise_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_owned(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_lines() {
        let html = r#"<html><body>
            <h1>Bitcoin rallies past resistance</h1>
            <p>Spot ETF inflows continued for a fifth day.</p>
            <p>Analysts expect volatility into the weekend.</p>
        </body></html>"#;
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert_eq!(
            text,
            "Bitcoin rallies past resistance\n\
             Spot ETF inflows continued for a fifth day.\n\
             Analysts expect volatility into the weekend."
        );
    }

    #[test]
    fn boilerplate_is_removed() {
        let html = r#"<html><body>
            <header><p>Header paragraph text</p></header>
            <nav><li>Navigation link one</li></nav>
            <main><p>Main story paragraph</p></main>
            <aside><p>Sidebar promotion</p></aside>
            <footer><p>Footer copyright</p></footer>
            <script>var tracking = "script payload";</script>
            <style>.x { color: red; }</style>
            <noscript>Enable JavaScript please</noscript>
        </body></html>"#;
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert!(text.contains("Main story paragraph"));
        for gone in [
            "Header paragraph",
            "Navigation link",
            "Sidebar promotion",
            "Footer copyright",
            "script payload",
            "color: red",
            "Enable JavaScript",
        ] {
            assert!(!text.contains(gone), "{gone} leaked into {text:?}");
        }
    }

    #[test]
    fn short_fragments_are_dropped() {
        let html = "<html><body><li>Home</li><li>12345</li><li>Market wrap-up</li></body></html>";
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert_eq!(text, "Market wrap-up");
    }

    #[test]
    fn nested_text_is_taken_once() {
        let html = r#"<html><body><article>Lead sentence of the article.
            <p>Body paragraph of the article.</p></article></body></html>"#;
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert_eq!(text.matches("Body paragraph").count(), 1);
        assert!(text.starts_with("Lead sentence of the article."));
    }

    #[test]
    fn falls_back_to_body_text() {
        let html = "<html><body><div>Only   a\n\n div with   text</div></body></html>";
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert_eq!(text, "Only a div with text");
    }

    #[test]
    fn near_empty_body_yields_empty_text() {
        let html = "<html><body><div>Hi</div></body></html>";
        assert!(extract_fragments(html, DEFAULT_MAX_CHARS).is_empty());
        let html = "<html><body><div>12345</div></body></html>";
        assert!(extract_fragments(html, DEFAULT_MAX_CHARS).is_empty());
    }

    #[test]
    fn empty_page_yields_empty_text() {
        assert!(extract_fragments("", DEFAULT_MAX_CHARS).is_empty());
        let scripts_only = "<html><body><script>console.log('x')</script></body></html>";
        assert!(extract_fragments(scripts_only, DEFAULT_MAX_CHARS).is_empty());
    }

    #[test]
    fn output_is_capped_in_characters() {
        let html = format!("<html><body><p>{}</p></body></html>", "é".repeat(500));
        let text = extract_fragments(&html, 100);
        assert_eq!(text.chars().count(), 100);
    }

    #[test]
    fn nav_tag_not_confused_with_similar_tags() {
        let html = "<html><body><nav>Skip this</nav><p>Keep this navigate text</p></body></html>";
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert!(!text.contains("Skip this"));
        assert!(text.contains("navigate text"));
    }

    #[test]
    fn table_cells_are_content() {
        let html = "<html><body><table><tr><td>Bitcoin dominance</td><td>54.2%</td></tr></table></body></html>";
        let text = extract_fragments(html, DEFAULT_MAX_CHARS);
        assert_eq!(text, "Bitcoin dominance");
    }
}
