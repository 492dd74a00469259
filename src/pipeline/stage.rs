use serde::Serialize;
use std::fmt;

use super::{AcquisitionMode, RecipeSource};

/// One step of the acquisition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CaptionFetch,
    CaptionClean,
    CaptionExtract,
    AudioFetch,
    AudioTranscribe,
    /// `EmptyResult` here means the transcript was rejected as music or
    /// other non-cooking content
    ContentClassify,
    TranscriptExtract,
    VideoFrameAnalyze,
    VideoFrameExtract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CaptionFetch => "caption fetch",
            Stage::CaptionClean => "caption clean",
            Stage::CaptionExtract => "caption extract",
            Stage::AudioFetch => "audio fetch",
            Stage::AudioTranscribe => "audio transcribe",
            Stage::ContentClassify => "content classify",
            Stage::TranscriptExtract => "transcript extract",
            Stage::VideoFrameAnalyze => "video frame analyze",
            Stage::VideoFrameExtract => "video frame extract",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum StageOutcome {
    Success,
    EmptyResult,
    HardFailure(String),
}

impl StageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Success)
    }
}

/// What happened at one stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// Where the driver goes after a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(Stage),
    Finish(RecipeSource),
    /// Fast mode ran out of caption stages
    NeedsFullAnalysis,
    Exhausted,
}

/// The full transition table of the acquisition state machine.
pub fn transition(stage: Stage, outcome: &StageOutcome, mode: AcquisitionMode) -> Transition {
    use Stage::*;

    let after_captions = match mode {
        AcquisitionMode::Fast => Transition::NeedsFullAnalysis,
        AcquisitionMode::Full => Transition::Next(AudioFetch),
    };

    match (stage, outcome) {
        (CaptionFetch, StageOutcome::Success) => Transition::Next(CaptionClean),
        (CaptionClean, StageOutcome::Success) => Transition::Next(CaptionExtract),
        (CaptionExtract, StageOutcome::Success) => Transition::Finish(match mode {
            AcquisitionMode::Fast => RecipeSource::CaptionsOnly,
            AcquisitionMode::Full => RecipeSource::Captions,
        }),
        (CaptionFetch | CaptionClean | CaptionExtract, _) => after_captions,

        (AudioFetch, StageOutcome::Success) => Transition::Next(AudioTranscribe),
        (AudioTranscribe, StageOutcome::Success) => Transition::Next(ContentClassify),
        // Classification fails open
        (ContentClassify, StageOutcome::Success | StageOutcome::HardFailure(_)) => {
            Transition::Next(TranscriptExtract)
        }
        (TranscriptExtract, StageOutcome::Success) => {
            Transition::Finish(RecipeSource::AudioTranscript)
        }
        (AudioFetch | AudioTranscribe | ContentClassify | TranscriptExtract, _) => {
            Transition::Next(VideoFrameAnalyze)
        }

        (VideoFrameAnalyze, StageOutcome::Success) => Transition::Next(VideoFrameExtract),
        (VideoFrameExtract, StageOutcome::Success) => {
            Transition::Finish(RecipeSource::VideoAnalysisFallback)
        }
        (VideoFrameAnalyze | VideoFrameExtract, _) => Transition::Exhausted,
    }
}
