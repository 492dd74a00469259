use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Serialize)]
struct ContentRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
}

/// Client for a headless-browser service that renders a page and returns
/// its inner text.
#[derive(Clone)]
pub struct PageScriber {
    endpoint: String,
    client: Client,
}

impl PageScriber {
    pub fn new(client: Client, page_scriber_url: &str) -> Self {
        let endpoint = format!(
            "{}/api/fetch-content",
            page_scriber_url.trim_end_matches('/')
        );
        Self { endpoint, client }
    }

    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ContentRequest { url })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let content: ContentResponse = response.json().await?;
        Ok(content.content)
    }
}
