//! The content acquisition state machine: captions, then audio, then video
//! frames, each followed by structured extraction.

mod orchestrator;
mod stage;

pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use stage::{transition, Stage, StageOutcome, StageRecord, Transition};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMode {
    /// Captions only
    Fast,
    /// Captions, then audio, then video frames
    #[default]
    Full,
}

impl FromStr for AcquisitionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(AcquisitionMode::Fast),
            "full" => Ok(AcquisitionMode::Full),
            other => Err(format!("unknown acquisition mode '{}'", other)),
        }
    }
}

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    Captions,
    AudioTranscript,
    VideoAnalysisFallback,
    /// Any fast-mode result
    CaptionsOnly,
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecipeSource::Captions => "captions",
            RecipeSource::AudioTranscript => "audio_transcript",
            RecipeSource::VideoAnalysisFallback => "video_analysis_fallback",
            RecipeSource::CaptionsOnly => "captions_only",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionResult {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub source: RecipeSource,
    /// Set when fast mode found nothing; a full run may still succeed
    pub needs_full_analysis: bool,
    pub stages: Vec<StageRecord>,
}

impl AcquisitionResult {
    /// Whether the run reached `stage` at all.
    pub fn attempted(&self, stage: Stage) -> bool {
        self.stages.iter().any(|record| record.stage == stage)
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.instructions.is_empty()
    }
}
