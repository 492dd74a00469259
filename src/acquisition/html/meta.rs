use html_escape::decode_html_entities;
use scraper::{Html, Selector};

/// Selectors tried in order; social platforms put the full caption in
/// `og:description`.
const DESCRIPTION_SELECTORS: [&str; 3] = [
    "meta[property='og:description']",
    "meta[name='description']",
    "meta[name='twitter:description']",
];

/// The page's caption as published in its meta tags, or "" when absent.
pub(crate) fn extract_meta_description(document: &Html) -> String {
    DESCRIPTION_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|selector| {
            document
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .map(|content| decode_html_entities(content).trim().to_string())
                .find(|content| !content.is_empty())
        })
        .next()
        .unwrap_or_default()
}
