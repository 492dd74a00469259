use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Retry policy for rate-limited text-generation calls
    #[serde(default)]
    pub retry: RetryConfig,
    /// Acquisition collaborator endpoints
    #[serde(default)]
    pub services: ServicesConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4o-mini", "claude-3-5-haiku-latest")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Bounded retry for rate-limited calls
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first; the default allows 3 retries
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

/// Endpoints of the acquisition collaborators
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    /// Headless page renderer returning a page's inner text
    pub page_scriber_url: Option<String>,
    /// Service returning the audio track of a video URL
    pub audio_service_url: Option<String>,
    /// Service returning a text description of a video's frames
    pub frame_analyzer_url: Option<String>,
    /// Speech-to-text API key (falls back to GOOGLE_API_KEY)
    pub speech_api_key: Option<String>,
    #[serde(default = "default_max_audio_bytes")]
    pub max_audio_bytes: usize,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            page_scriber_url: None,
            audio_service_url: None,
            frame_analyzer_url: None,
            speech_api_key: None,
            max_audio_bytes: default_max_audio_bytes(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_retry_attempts() -> u32 {
    4
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_max_audio_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_HARVEST__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_HARVEST__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_HARVEST__RETRY__DELAY_MS
        .add_source(
            Environment::with_prefix("RECIPE_HARVEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        assert_eq!(default_provider(), "openai");
        assert_eq!(default_retry_attempts(), 4);
        assert_eq!(default_retry_delay_ms(), 2000);
        assert_eq!(default_max_audio_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_retry_config_policy() {
        let policy = RetryConfig::default().policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            default_provider = "anthropic"
            timeout = 10

            [providers.anthropic]
            enabled = true
            model = "claude-3-5-haiku-latest"
            api_key = "test-key"

            [retry]
            delay_ms = 50

            [services]
            audio_service_url = "http://localhost:9000"
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.delay_ms, 50);
        assert_eq!(
            config.services.audio_service_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(config.services.frame_analyzer_url.is_none());

        let provider = &config.providers["anthropic"];
        assert_eq!(provider.temperature, 0.2);
        assert_eq!(provider.max_tokens, 2000);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.default_provider, "openai");
        assert!(config.providers.is_empty());
        assert_eq!(config.timeout, 30);
    }
}
