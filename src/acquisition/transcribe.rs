use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::Transcriber;
use crate::error::TranscriptionError;

const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com";

/// Speech-to-text over the Google Cloud Speech `recognize` API.
pub struct SpeechTranscriber {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    language_code: String,
    max_audio_bytes: usize,
}

impl SpeechTranscriber {
    /// `api_key` falls back to the `GOOGLE_API_KEY` environment variable.
    pub fn new(client: Client, api_key: Option<String>, max_audio_bytes: usize) -> Self {
        Self {
            client,
            api_key: api_key.or_else(|| std::env::var("GOOGLE_API_KEY").ok()),
            base_url: DEFAULT_BASE_URL.to_string(),
            language_code: "en-US".to_string(),
            max_audio_bytes,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }
}

/// Maps a failed recognize call to the matching typed error.
fn classify_failure(status: StatusCode, body: &str, bytes: usize) -> TranscriptionError {
    let lowered = body.to_lowercase();
    match status {
        StatusCode::TOO_MANY_REQUESTS => TranscriptionError::QuotaExceeded,
        StatusCode::FORBIDDEN if lowered.contains("quota") => TranscriptionError::QuotaExceeded,
        StatusCode::PAYLOAD_TOO_LARGE => TranscriptionError::FileTooLarge { bytes },
        StatusCode::BAD_REQUEST if lowered.contains("too long") || lowered.contains("exceeds") => {
            TranscriptionError::FileTooLarge { bytes }
        }
        StatusCode::BAD_REQUEST | StatusCode::UNSUPPORTED_MEDIA_TYPE
            if lowered.contains("encoding")
                || lowered.contains("format")
                || lowered.contains("sample rate") =>
        {
            TranscriptionError::UnsupportedFormat(body.trim().to_string())
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            TranscriptionError::UnsupportedFormat(body.trim().to_string())
        }
        _ => TranscriptionError::Request(format!("speech API error ({}): {}", status, body.trim())),
    }
}

#[async_trait]
impl Transcriber for SpeechTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        if audio.len() > self.max_audio_bytes {
            return Err(TranscriptionError::FileTooLarge { bytes: audio.len() });
        }
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TranscriptionError::Request("GOOGLE_API_KEY not found in config or environment".to_string())
        })?;

        let url = format!("{}/v1/speech:recognize?key={}", self.base_url, api_key);
        let request_body = json!({
            "config": {
                "languageCode": self.language_code,
                "enableAutomaticPunctuation": true
            },
            "audio": {
                "content": STANDARD.encode(audio)
            }
        });

        info!("Transcribing {} bytes of audio", audio.len());
        let response = self.client.post(&url).json(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body, audio.len()));
        }

        let response_body: Value = response.json().await?;
        debug!("Speech API response: {:?}", response_body);

        // Each result covers a consecutive stretch of audio
        let transcript = response_body["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|r| r["alternatives"][0]["transcript"].as_str())
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        Ok(transcript)
    }
}
