use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::FrameAnalyzer;
use crate::error::FetchError;

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    content: String,
}

/// Client for a service that samples a video's frames and describes them
/// (on-screen text, visible ingredients, actions).
pub struct FrameAnalyzerClient {
    client: Client,
    endpoint: Option<String>,
}

impl FrameAnalyzerClient {
    pub fn new(client: Client, frame_analyzer_url: Option<&str>) -> Self {
        let endpoint =
            frame_analyzer_url.map(|base| format!("{}/api/analyze", base.trim_end_matches('/')));
        Self { client, endpoint }
    }
}

#[async_trait]
impl FrameAnalyzer for FrameAnalyzerClient {
    async fn analyze_frames(&self, url: &str) -> Result<String, FetchError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| FetchError::ServiceUnavailable("frame analyzer".to_string()))?;

        info!("Analyzing video frames for {}", url);
        let response = self
            .client
            .post(endpoint)
            .json(&AnalyzeRequest { url })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: endpoint.to_string(),
            });
        }

        let analysis: AnalyzeResponse = response.json().await?;
        Ok(analysis.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_analyze_frames() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": "On screen: 200g spaghetti, 2 eggs"}"#)
            .create_async()
            .await;

        let analyzer = FrameAnalyzerClient::new(Client::new(), Some(&server.url()));
        let text = analyzer.analyze_frames("https://www.instagram.com/reel/x/").await.unwrap();
        assert!(text.contains("spaghetti"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_content_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/analyze")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let analyzer = FrameAnalyzerClient::new(Client::new(), Some(&server.url()));
        assert_eq!(analyzer.analyze_frames("https://x.test/v").await.unwrap(), "");
    }
}
