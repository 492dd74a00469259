use log::{debug, info, warn};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

use super::stage::{transition, Stage, StageOutcome, StageRecord, Transition};
use super::{AcquisitionMode, AcquisitionResult, RecipeSource};
use crate::acquisition::{
    clean_caption, AudioServiceClient, AudioSource, CaptionSource, FrameAnalyzer,
    FrameAnalyzerClient, PageScriber, Platform, RequestFetcher, SocialCaptionFetcher,
    SpeechTranscriber, Transcriber, WebPageFetcher,
};
use crate::config::AppConfig;
use crate::error::{AcquisitionError, ServiceError};
use crate::model::{ExtractedRecipe, RawContent, SourceKind};
use crate::providers::ProviderFactory;
use crate::retry::{retry_with, RetryPolicy};
use crate::services::{LlmTextService, TextService};

/// Drives one URL through the acquisition stages.
///
/// Holds no per-request state, so one orchestrator can serve concurrent
/// calls.
pub struct Orchestrator {
    captions: HashMap<Platform, Arc<dyn CaptionSource>>,
    default_captions: Option<Arc<dyn CaptionSource>>,
    audio: Option<Arc<dyn AudioSource>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    frames: Option<Arc<dyn FrameAnalyzer>>,
    text: Arc<dyn TextService>,
    retry: RetryPolicy,
}

/// Intermediate values handed from one stage to the next.
struct Run<'a> {
    url: &'a str,
    caption_source: Arc<dyn CaptionSource>,
    caption: Option<RawContent>,
    audio: Option<Vec<u8>>,
    transcript: Option<String>,
    frames: Option<String>,
    recipe: Option<ExtractedRecipe>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Wires the HTTP collaborators and the default provider from
    /// configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AcquisitionError::BuilderError(e.to_string()))?;
        let fetcher = RequestFetcher::new(Some(config.timeout()))
            .map_err(|e| AcquisitionError::BuilderError(e.to_string()))?;

        let services = &config.services;
        let scriber = services
            .page_scriber_url
            .as_deref()
            .map(|url| PageScriber::new(client.clone(), url));

        let social = Arc::new(SocialCaptionFetcher::new(fetcher.clone(), scriber.clone()));
        let web = Arc::new(WebPageFetcher::new(fetcher, scriber));
        let provider = ProviderFactory::get_default_provider(config)?;
        info!("Using {} for text services", provider.provider_name());

        Orchestrator::builder()
            .caption_source_for(Platform::TikTok, social.clone())
            .caption_source_for(Platform::Instagram, social)
            .caption_source_for(Platform::Web, web)
            .audio_source(Arc::new(AudioServiceClient::new(
                client.clone(),
                services.audio_service_url.as_deref(),
            )))
            .transcriber(Arc::new(SpeechTranscriber::new(
                client.clone(),
                services.speech_api_key.clone(),
                services.max_audio_bytes,
            )))
            .frame_analyzer(Arc::new(FrameAnalyzerClient::new(
                client,
                services.frame_analyzer_url.as_deref(),
            )))
            .text_service(Arc::new(LlmTextService::new(provider)))
            .retry_policy(config.retry.policy())
            .build()
    }

    /// Runs the stage machine for `url`.
    ///
    /// Fast mode returns `needs_full_analysis` instead of failing when the
    /// captions hold no recipe. Full mode fails with `AcquisitionFailed`
    /// only after every fallback has been tried.
    pub async fn acquire_and_extract(
        &self,
        url: &str,
        mode: AcquisitionMode,
    ) -> Result<AcquisitionResult, AcquisitionError> {
        let platform = Platform::detect(url)?;
        let caption_source = self
            .captions
            .get(&platform)
            .or(self.default_captions.as_ref())
            .cloned()
            .ok_or_else(|| AcquisitionError::UnsupportedPlatform(url.to_string()))?;

        info!("Acquiring recipe from {} ({}, {:?} mode)", url, platform, mode);

        let mut run = Run {
            url,
            caption_source,
            caption: None,
            audio: None,
            transcript: None,
            frames: None,
            recipe: None,
        };
        let mut stages = Vec::new();
        let mut stage = Stage::CaptionFetch;

        loop {
            let outcome = self.run_stage(stage, &mut run).await;
            debug!("Stage {}: {:?}", stage, outcome);
            let next = transition(stage, &outcome, mode);
            stages.push(StageRecord { stage, outcome });

            match next {
                Transition::Next(next_stage) => stage = next_stage,
                Transition::Finish(source) => {
                    let recipe = run.recipe.take().unwrap_or_default();
                    info!(
                        "Found {} ingredients and {} instructions via {}",
                        recipe.ingredients.len(),
                        recipe.instructions.len(),
                        source
                    );
                    return Ok(AcquisitionResult {
                        ingredients: recipe.ingredients,
                        instructions: recipe.instructions,
                        source,
                        needs_full_analysis: false,
                        stages,
                    });
                }
                Transition::NeedsFullAnalysis => {
                    info!("No recipe in captions of {}; full analysis needed", url);
                    return Ok(AcquisitionResult {
                        ingredients: Vec::new(),
                        instructions: Vec::new(),
                        source: RecipeSource::CaptionsOnly,
                        needs_full_analysis: true,
                        stages,
                    });
                }
                Transition::Exhausted => {
                    warn!("Every acquisition stage failed for {}", url);
                    return Err(AcquisitionError::AcquisitionFailed {
                        message: format!("no recipe found at {} after all fallbacks", url),
                        stages,
                    });
                }
            }
        }
    }

    async fn run_stage(&self, stage: Stage, run: &mut Run<'_>) -> StageOutcome {
        match stage {
            Stage::CaptionFetch => match run.caption_source.fetch_caption(run.url).await {
                Ok(content) if content.text.trim().is_empty() => StageOutcome::EmptyResult,
                Ok(content) => {
                    run.caption = Some(content);
                    StageOutcome::Success
                }
                Err(e) => StageOutcome::HardFailure(e.to_string()),
            },
            Stage::CaptionClean => match run.caption.take() {
                Some(content) => {
                    let cleaned = clean_caption(&content.text);
                    if cleaned.is_empty() {
                        StageOutcome::EmptyResult
                    } else {
                        run.caption = Some(RawContent::new(cleaned, content.source_kind));
                        StageOutcome::Success
                    }
                }
                None => StageOutcome::EmptyResult,
            },
            Stage::CaptionExtract => match run.caption.take() {
                Some(content) => self.extract(content, run).await,
                None => StageOutcome::EmptyResult,
            },
            Stage::AudioFetch => {
                let Some(audio) = &self.audio else {
                    return StageOutcome::HardFailure("no audio source configured".to_string());
                };
                match audio.fetch_audio(run.url).await {
                    Ok(blob) => {
                        run.audio = Some(blob);
                        StageOutcome::Success
                    }
                    Err(e) => StageOutcome::HardFailure(e.to_string()),
                }
            }
            Stage::AudioTranscribe => {
                let Some(transcriber) = &self.transcriber else {
                    return StageOutcome::HardFailure("no transcriber configured".to_string());
                };
                let Some(audio) = run.audio.take() else {
                    return StageOutcome::EmptyResult;
                };
                match transcriber.transcribe(&audio).await {
                    Ok(text) if text.trim().is_empty() => StageOutcome::EmptyResult,
                    Ok(text) => {
                        run.transcript = Some(text);
                        StageOutcome::Success
                    }
                    Err(e) => StageOutcome::HardFailure(e.to_string()),
                }
            }
            Stage::ContentClassify => {
                let Some(transcript) = run.transcript.as_deref() else {
                    return StageOutcome::EmptyResult;
                };
                let verdict = retry_with(
                    &self.retry,
                    "content classification",
                    ServiceError::is_rate_limited,
                    || self.text.classify(transcript),
                )
                .await;

                match verdict {
                    Ok(false) => StageOutcome::Success,
                    Ok(true) => {
                        info!("Transcript is not cooking content, discarding it");
                        run.transcript = None;
                        StageOutcome::EmptyResult
                    }
                    Err(e) => {
                        warn!("Classification failed ({}), treating transcript as cooking content", e);
                        StageOutcome::HardFailure(e.to_string())
                    }
                }
            }
            Stage::TranscriptExtract => match run.transcript.take() {
                Some(text) => {
                    self.extract(RawContent::new(text, SourceKind::Transcript), run)
                        .await
                }
                None => StageOutcome::EmptyResult,
            },
            Stage::VideoFrameAnalyze => {
                let Some(frames) = &self.frames else {
                    return StageOutcome::HardFailure("no frame analyzer configured".to_string());
                };
                match frames.analyze_frames(run.url).await {
                    Ok(text) if text.trim().is_empty() => StageOutcome::EmptyResult,
                    Ok(text) => {
                        run.frames = Some(text);
                        StageOutcome::Success
                    }
                    Err(e) => StageOutcome::HardFailure(e.to_string()),
                }
            }
            Stage::VideoFrameExtract => match run.frames.take() {
                Some(text) => {
                    self.extract(RawContent::new(text, SourceKind::FrameAnalysis), run)
                        .await
                }
                None => StageOutcome::EmptyResult,
            },
        }
    }

    /// Structured extraction with rate-limit retries. Exhausted retries and
    /// other failures leave the stage without a recipe.
    async fn extract(&self, content: RawContent, run: &mut Run<'_>) -> StageOutcome {
        let extracted = retry_with(
            &self.retry,
            "recipe extraction",
            ServiceError::is_rate_limited,
            || self.text.extract(&content.text, content.source_kind),
        )
        .await;

        match extracted {
            Ok(recipe) if recipe.is_empty() => StageOutcome::EmptyResult,
            Ok(recipe) => {
                run.recipe = Some(recipe);
                StageOutcome::Success
            }
            Err(e) => {
                warn!("Extraction from {} failed: {}", content.source_kind, e);
                StageOutcome::HardFailure(e.to_string())
            }
        }
    }
}

/// Builder for an [`Orchestrator`] with injected collaborators.
#[derive(Default)]
pub struct OrchestratorBuilder {
    captions: HashMap<Platform, Arc<dyn CaptionSource>>,
    default_captions: Option<Arc<dyn CaptionSource>>,
    audio: Option<Arc<dyn AudioSource>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    frames: Option<Arc<dyn FrameAnalyzer>>,
    text: Option<Arc<dyn TextService>>,
    retry: RetryPolicy,
}

impl OrchestratorBuilder {
    /// Caption source used for platforms without a specific one.
    pub fn caption_source(mut self, source: Arc<dyn CaptionSource>) -> Self {
        self.default_captions = Some(source);
        self
    }

    pub fn caption_source_for(mut self, platform: Platform, source: Arc<dyn CaptionSource>) -> Self {
        self.captions.insert(platform, source);
        self
    }

    pub fn audio_source(mut self, source: Arc<dyn AudioSource>) -> Self {
        self.audio = Some(source);
        self
    }

    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn frame_analyzer(mut self, analyzer: Arc<dyn FrameAnalyzer>) -> Self {
        self.frames = Some(analyzer);
        self
    }

    pub fn text_service(mut self, service: Arc<dyn TextService>) -> Self {
        self.text = Some(service);
        self
    }

    /// Defaults to 3 retries after the first attempt, 2 seconds apart.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn build(self) -> Result<Orchestrator, AcquisitionError> {
        let text = self.text.ok_or_else(|| {
            AcquisitionError::BuilderError("No text service specified".to_string())
        })?;
        if self.captions.is_empty() && self.default_captions.is_none() {
            return Err(AcquisitionError::BuilderError(
                "No caption source specified".to_string(),
            ));
        }

        Ok(Orchestrator {
            captions: self.captions,
            default_captions: self.default_captions,
            audio: self.audio,
            transcriber: self.transcriber,
            frames: self.frames,
            text,
            retry: self.retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, RetryConfig, ServicesConfig};
    use async_trait::async_trait;

    struct NoText;

    #[async_trait]
    impl TextService for NoText {
        async fn classify(&self, _text: &str) -> Result<bool, ServiceError> {
            Ok(false)
        }

        async fn extract(
            &self,
            _text: &str,
            _source_kind: SourceKind,
        ) -> Result<ExtractedRecipe, ServiceError> {
            Ok(ExtractedRecipe::default())
        }

        async fn normalize_ingredient(
            &self,
            line: &str,
        ) -> Result<crate::model::ParsedIngredient, ServiceError> {
            Ok(crate::ingredients::parse_ingredient_line(line))
        }
    }

    struct NoCaptions;

    #[async_trait]
    impl CaptionSource for NoCaptions {
        async fn fetch_caption(&self, _url: &str) -> Result<RawContent, crate::error::FetchError> {
            Ok(RawContent::new("", SourceKind::Caption))
        }
    }

    #[test]
    fn test_builder_requires_text_service() {
        let result = Orchestrator::builder()
            .caption_source(Arc::new(NoCaptions))
            .build();
        assert!(matches!(result, Err(AcquisitionError::BuilderError(_))));
    }

    #[test]
    fn test_builder_requires_caption_source() {
        let result = Orchestrator::builder().text_service(Arc::new(NoText)).build();
        assert!(matches!(result, Err(AcquisitionError::BuilderError(_))));
    }

    #[tokio::test]
    async fn test_platform_without_source_is_unsupported() {
        let orchestrator = Orchestrator::builder()
            .caption_source_for(Platform::TikTok, Arc::new(NoCaptions))
            .text_service(Arc::new(NoText))
            .build()
            .unwrap();

        let result = orchestrator
            .acquire_and_extract("https://www.example.com/recipe", AcquisitionMode::Fast)
            .await;
        assert!(matches!(result, Err(AcquisitionError::UnsupportedPlatform(_))));
    }

    #[tokio::test]
    async fn test_missing_collaborators_exhaust_full_mode() {
        let orchestrator = Orchestrator::builder()
            .caption_source(Arc::new(NoCaptions))
            .text_service(Arc::new(NoText))
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap();

        match orchestrator
            .acquire_and_extract("https://www.tiktok.com/@a/video/1", AcquisitionMode::Full)
            .await
        {
            Err(AcquisitionError::AcquisitionFailed { stages, .. }) => {
                let visited: Vec<Stage> = stages.iter().map(|r| r.stage).collect();
                assert_eq!(
                    visited,
                    vec![Stage::CaptionFetch, Stage::AudioFetch, Stage::VideoFrameAnalyze]
                );
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.source)),
        }
    }

    #[test]
    fn test_from_config() {
        let mut providers = HashMap::new();
        providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                enabled: true,
                model: "llama3".to_string(),
                temperature: 0.2,
                max_tokens: 2000,
                api_key: None,
                base_url: None,
            },
        );
        let config = AppConfig {
            default_provider: "ollama".to_string(),
            providers,
            retry: RetryConfig::default(),
            services: ServicesConfig::default(),
            timeout: 5,
        };

        let orchestrator = Orchestrator::from_config(&config).unwrap();
        assert_eq!(orchestrator.captions.len(), 3);
        assert_eq!(orchestrator.retry, RetryPolicy::default());
    }
}
