use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;

use super::AudioSource;
use crate::error::FetchError;

#[derive(Serialize)]
struct AudioRequest<'a> {
    url: &'a str,
}

/// Client for a service that downloads a video and returns its audio track.
pub struct AudioServiceClient {
    client: Client,
    endpoint: Option<String>,
}

impl AudioServiceClient {
    /// `audio_service_url` of `None` leaves the client unavailable; every
    /// fetch then fails with `ServiceUnavailable`.
    pub fn new(client: Client, audio_service_url: Option<&str>) -> Self {
        let endpoint =
            audio_service_url.map(|base| format!("{}/api/audio", base.trim_end_matches('/')));
        Self { client, endpoint }
    }
}

#[async_trait]
impl AudioSource for AudioServiceClient {
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| FetchError::ServiceUnavailable("audio service".to_string()))?;

        info!("Fetching audio track for {}", url);
        let response = self
            .client
            .post(endpoint)
            .json(&AudioRequest { url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let audio = response.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(FetchError::EmptyAudio);
        }

        debug!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }
}
