//! Recipe acquisition from short-form video and recipe pages, plus
//! ingredient parsing, deduplication and merging.
//!
//! The acquisition pipeline tries captions first, then the audio track,
//! then video frames, and reports which path produced the recipe:
//!
//! ```no_run
//! # use recipe_harvest::{acquire_and_extract, AcquisitionMode};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let result = acquire_and_extract("https://www.tiktok.com/@chef/video/1", AcquisitionMode::Full).await?;
//! println!("{} via {}", result.ingredients.join(", "), result.source);
//! # Ok(())
//! # }
//! ```

pub mod acquisition;
pub mod config;
pub mod error;
pub mod ingredients;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod retry;
pub mod services;

pub use acquisition::Platform;
pub use config::AppConfig;
pub use error::{AcquisitionError, FetchError, ProviderError, ServiceError, TranscriptionError};
pub use ingredients::{
    deduplicate_ingredients, merge_ingredient_lists, normalize_ingredients, parse_ingredient_line,
    parse_ingredients, MergedIngredient,
};
pub use model::{Amount, ExtractedRecipe, ParsedIngredient, QuantityRange, RawContent, SourceKind};
pub use pipeline::{
    AcquisitionMode, AcquisitionResult, Orchestrator, RecipeSource, Stage, StageOutcome,
    StageRecord,
};
pub use retry::RetryPolicy;
pub use services::{LlmTextService, TextService};

/// Acquires a recipe from `url` with collaborators built from
/// `config.toml` and `RECIPE_HARVEST__*` environment variables.
pub async fn acquire_and_extract(
    url: &str,
    mode: AcquisitionMode,
) -> Result<AcquisitionResult, AcquisitionError> {
    let config = AppConfig::load()?;
    let orchestrator = Orchestrator::from_config(&config)?;
    orchestrator.acquire_and_extract(url, mode).await
}
