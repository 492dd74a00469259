use thiserror::Error;

use crate::pipeline::StageRecord;

/// Errors surfaced to callers of the acquisition pipeline
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The URL matches no platform with an acquisition strategy
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Every stage ran and none produced a recipe
    #[error("Acquisition failed: {message}")]
    AcquisitionFailed {
        message: String,
        stages: Vec<StageRecord>,
    },

    /// Orchestrator is missing a required collaborator or field
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// The configured text-generation provider could not be created
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),
}

/// Errors from content acquisition collaborators (pages, audio, frames)
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch URL: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// Audio collaborators never hand back an empty blob
    #[error("Audio service returned no data")]
    EmptyAudio,

    /// The collaborator endpoint is not configured
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Errors from the speech-to-text collaborator
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Transcription quota exceeded")]
    QuotaExceeded,

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio file too large: {bytes} bytes")]
    FileTooLarge { bytes: usize },

    #[error("Transcription request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TranscriptionError {
    fn from(e: reqwest::Error) -> Self {
        TranscriptionError::Request(e.to_string())
    }
}

/// Errors from text-generation providers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("{0} not found in config or environment")]
    MissingApiKey(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider '{0}' is not enabled in configuration")]
    Disabled(String),
}

/// Errors from the classify/extract/normalize text service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Unparseable service response: {0}")]
    Unparseable(String),
}

impl ServiceError {
    /// True when the failure is a rate-limit signal worth retrying.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ServiceError::Provider(ProviderError::RateLimited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_predicate() {
        assert!(ServiceError::Provider(ProviderError::RateLimited).is_rate_limited());
        assert!(!ServiceError::Unparseable("x".to_string()).is_rate_limited());
        assert!(!ServiceError::Provider(ProviderError::Api {
            status: 500,
            message: "boom".to_string()
        })
        .is_rate_limited());
    }

    #[test]
    fn test_error_messages() {
        let err = AcquisitionError::UnsupportedPlatform("ftp://x".to_string());
        assert_eq!(err.to_string(), "Unsupported platform: ftp://x");

        let err = ProviderError::MissingApiKey("OPENAI_API_KEY".to_string());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
