//! Main-content extraction from parsed HTML
//!
//! Extraction prefers the first matching structural region among an ordered
//! list of content-area selectors and falls back to whole-page text when none
//! match. The precedence is fixed: first match wins.

use scraper::{Html, Selector};

/// Content-area selectors in precedence order
const CONTENT_SELECTORS: &[&str] = &["article", "main", r#"[role="main"]"#];

/// Raw content pulled from one fetched page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Uncleaned text of the main content region (or the whole page)
    pub raw_text: String,

    /// Absolute http(s) image URLs found in `<img src>` attributes
    pub image_urls: Vec<String>,
}

/// Parses an HTML body and extracts raw text plus candidate image URLs
///
/// Synchronous on purpose: the parsed DOM is not `Send` and must never be
/// held across an await point in the worker.
pub fn parse_page(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    PageContent {
        raw_text: extract_text(&document),
        image_urls: extract_image_urls(&document),
    }
}

/// Extracts text from the first matching content region, or the whole page
fn extract_text(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                return element.text().collect::<String>();
            }
        }
    }

    // Fallback: all text on the page
    document.root_element().text().collect::<String>()
}

/// Extracts image source URLs from the document
///
/// Only absolute http(s) sources are kept; relative sources and data URIs
/// are skipped.
fn extract_image_urls(document: &Html) -> Vec<String> {
    let mut urls = Vec::new();

    if let Ok(selector) = Selector::parse("img[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                let src = src.trim();
                if src.starts_with("http://") || src.starts_with("https://") {
                    urls.push(src.to_string());
                }
            }
        }
    }

    urls
}
