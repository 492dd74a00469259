use async_trait::async_trait;
use log::{debug, info, warn};
use scraper::Html;

use super::fetchers::{PageScriber, RequestFetcher};
use super::html::{extract_inner_texts, extract_json_ld_recipe};
use super::CaptionSource;
use crate::error::FetchError;
use crate::model::{RawContent, SourceKind};

/// Description fetcher for recipe webpages.
///
/// Prefers an embedded schema.org Recipe. Without one, falls back to the
/// page scriber's rendered text when configured, else the visible text of
/// the downloaded HTML.
pub struct WebPageFetcher {
    fetcher: RequestFetcher,
    scriber: Option<PageScriber>,
}

enum PageText {
    Structured(String),
    Blocks(String),
}

fn read_page(html: &str) -> PageText {
    let document = Html::parse_document(html);
    match extract_json_ld_recipe(&document) {
        Some(structured) => PageText::Structured(structured.to_text()),
        None => PageText::Blocks(extract_inner_texts(&document).join("\n")),
    }
}

impl WebPageFetcher {
    pub fn new(fetcher: RequestFetcher, scriber: Option<PageScriber>) -> Self {
        Self { fetcher, scriber }
    }
}

#[async_trait]
impl CaptionSource for WebPageFetcher {
    async fn fetch_caption(&self, url: &str) -> Result<RawContent, FetchError> {
        let html = self.fetcher.fetch(url).await?;

        let text = match read_page(&html) {
            PageText::Structured(text) => {
                info!("Found structured recipe data on {}", url);
                text
            }
            PageText::Blocks(blocks) => match &self.scriber {
                Some(scriber) => match scriber.fetch(url).await {
                    Ok(rendered) => rendered,
                    Err(e) => {
                        warn!("Page scriber failed for {} ({}), using raw page text", url, e);
                        blocks
                    }
                },
                None => blocks,
            },
        };

        debug!("Description for {}: {} chars", url, text.len());
        Ok(RawContent::new(text, SourceKind::Description))
    }
}
