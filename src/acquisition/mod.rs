//! Collaborators that turn a URL into raw text: captions and descriptions,
//! audio tracks, transcripts and video-frame analysis.

mod audio;
mod clean;
mod fetchers;
mod frames;
mod html;
mod platform;
mod social;
mod transcribe;
mod web;

pub use audio::AudioServiceClient;
pub use clean::clean_caption;
pub use fetchers::{PageScriber, RequestFetcher};
pub use frames::FrameAnalyzerClient;
pub use platform::Platform;
pub use social::SocialCaptionFetcher;
pub use transcribe::SpeechTranscriber;
pub use web::WebPageFetcher;

use async_trait::async_trait;

use crate::error::{FetchError, TranscriptionError};
use crate::model::RawContent;

/// Fetches the caption or description text attached to a URL.
///
/// Returns empty text, not an error, when the page loads but carries
/// nothing usable.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch_caption(&self, url: &str) -> Result<RawContent, FetchError>;
}

/// Fetches the audio track of a video. Never returns an empty blob.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Speech-to-text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError>;
}

/// Best-effort description or OCR of a video's frames. May return "".
#[async_trait]
pub trait FrameAnalyzer: Send + Sync {
    async fn analyze_frames(&self, url: &str) -> Result<String, FetchError>;
}
