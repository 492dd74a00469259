use async_trait::async_trait;
use log::{debug, info};
use scraper::Html;

use super::fetchers::{PageScriber, RequestFetcher};
use super::html::extract_meta_description;
use super::CaptionSource;
use crate::error::FetchError;
use crate::model::{RawContent, SourceKind};

/// Caption fetcher for short-form video platforms.
///
/// Uses the page scriber when one is configured, since rendered pages carry
/// the full caption. Otherwise reads the caption from the page's meta tags.
pub struct SocialCaptionFetcher {
    fetcher: RequestFetcher,
    scriber: Option<PageScriber>,
}

impl SocialCaptionFetcher {
    pub fn new(fetcher: RequestFetcher, scriber: Option<PageScriber>) -> Self {
        Self { fetcher, scriber }
    }
}

fn caption_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    extract_meta_description(&document)
}

#[async_trait]
impl CaptionSource for SocialCaptionFetcher {
    async fn fetch_caption(&self, url: &str) -> Result<RawContent, FetchError> {
        let text = match &self.scriber {
            Some(scriber) => {
                info!("Fetching caption for {} through page scriber", url);
                scriber.fetch(url).await?
            }
            None => {
                let html = self.fetcher.fetch(url).await?;
                caption_from_html(&html)
            }
        };

        debug!("Caption for {}: {} chars", url, text.len());
        Ok(RawContent::new(text, SourceKind::Caption))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::Client;

    #[tokio::test]
    async fn test_caption_from_meta_tags() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/@chef/video/1")
            .with_status(200)
            .with_body(
                r#"<html><head><meta property="og:description" content="Garlic noodles! 2 tbsp butter, 4 cloves garlic"></head></html>"#,
            )
            .create_async()
            .await;

        let fetcher = SocialCaptionFetcher::new(RequestFetcher::new(None).unwrap(), None);
        let content = fetcher
            .fetch_caption(&format!("{}/@chef/video/1", server.url()))
            .await
            .unwrap();
        assert_eq!(content.source_kind, SourceKind::Caption);
        assert!(content.text.contains("4 cloves garlic"));
    }

    #[tokio::test]
    async fn test_page_without_caption_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/video")
            .with_status(200)
            .with_body("<html><head></head><body></body></html>")
            .create_async()
            .await;

        let fetcher = SocialCaptionFetcher::new(RequestFetcher::new(None).unwrap(), None);
        let content = fetcher
            .fetch_caption(&format!("{}/video", server.url()))
            .await
            .unwrap();
        assert!(content.text.is_empty());
    }

    #[tokio::test]
    async fn test_uses_page_scriber_when_configured() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/fetch-content")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": "Full rendered caption"}"#)
            .create_async()
            .await;

        let scriber = PageScriber::new(Client::new(), &server.url());
        let fetcher = SocialCaptionFetcher::new(RequestFetcher::new(None).unwrap(), Some(scriber));
        let content = fetcher
            .fetch_caption("https://www.tiktok.com/@chef/video/1")
            .await
            .unwrap();
        assert_eq!(content.text, "Full rendered caption");
        mock.assert_async().await;
    }
}
