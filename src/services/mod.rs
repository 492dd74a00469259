//! Text-generation backed services: content classification, structured
//! recipe extraction and single-line ingredient normalization.

mod response;

use async_trait::async_trait;
use log::{debug, info};

use crate::error::ServiceError;
use crate::model::{ExtractedRecipe, ParsedIngredient, SourceKind};
use crate::providers::LlmProvider;

const CAPTION_EXTRACTION_PROMPT: &str = include_str!("prompts/extract_caption.txt");
const TRANSCRIPT_EXTRACTION_PROMPT: &str = include_str!("prompts/extract_transcript.txt");
const CLASSIFICATION_PROMPT: &str = include_str!("prompts/classify.txt");
const NORMALIZATION_PROMPT: &str = include_str!("prompts/normalize.txt");

/// The text capability the orchestrator and batch normalizer depend on.
///
/// Implementations must turn malformed model output into an empty or
/// degraded value. Only transport and provider failures are errors, so
/// callers can tell "no recipe" apart from "ask again later".
#[async_trait]
pub trait TextService: Send + Sync {
    /// Returns `true` when `text` is music or other non-cooking content.
    async fn classify(&self, text: &str) -> Result<bool, ServiceError>;

    /// Pulls ingredient and instruction lines out of `text`. Caption-like
    /// sources are held to a stricter standard than transcripts.
    async fn extract(
        &self,
        text: &str,
        source_kind: SourceKind,
    ) -> Result<ExtractedRecipe, ServiceError>;

    /// Structures one ingredient line.
    async fn normalize_ingredient(&self, line: &str) -> Result<ParsedIngredient, ServiceError>;
}

/// `TextService` backed by any `LlmProvider`.
pub struct LlmTextService {
    provider: Box<dyn LlmProvider>,
}

impl LlmTextService {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }
}

#[async_trait]
impl TextService for LlmTextService {
    async fn classify(&self, text: &str) -> Result<bool, ServiceError> {
        let reply = self.provider.complete(CLASSIFICATION_PROMPT, text).await?;
        debug!("Classification reply: {}", reply);
        Ok(response::parse_classification(&reply))
    }

    async fn extract(
        &self,
        text: &str,
        source_kind: SourceKind,
    ) -> Result<ExtractedRecipe, ServiceError> {
        let prompt = if source_kind.is_strict() {
            CAPTION_EXTRACTION_PROMPT
        } else {
            TRANSCRIPT_EXTRACTION_PROMPT
        };

        info!(
            "Extracting recipe from {} with {}",
            source_kind,
            self.provider.provider_name()
        );
        let reply = self.provider.complete(prompt, text).await?;
        Ok(response::parse_extraction(&reply))
    }

    async fn normalize_ingredient(&self, line: &str) -> Result<ParsedIngredient, ServiceError> {
        let reply = self.provider.complete(NORMALIZATION_PROMPT, line).await?;
        response::parse_normalized(&reply, line)
    }
}
