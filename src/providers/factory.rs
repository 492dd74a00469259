use crate::config::{AppConfig, ProviderConfig};
use crate::error::ProviderError;
use crate::providers::{AnthropicProvider, LlmProvider, OllamaProvider, OpenAIProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        if !config.enabled {
            return Err(ProviderError::Disabled(provider_name.to_string()));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            "ollama" => Ok(Box::new(OllamaProvider::new(config)?)),
            _ => Err(ProviderError::UnknownProvider(provider_name.to_string())),
        }
    }

    /// Get the default provider from configuration.
    ///
    /// With no `[providers.openai]` section the OpenAI provider is built from
    /// `OPENAI_API_KEY` with a small default model.
    pub fn get_default_provider(config: &AppConfig) -> Result<Box<dyn LlmProvider>, ProviderError> {
        let provider_name = &config.default_provider;
        match config.providers.get(provider_name) {
            Some(provider_config) => Self::create(provider_name, provider_config),
            None if provider_name == "openai" => {
                let fallback = ProviderConfig {
                    enabled: true,
                    model: "gpt-4o-mini".to_string(),
                    temperature: 0.2,
                    max_tokens: 2000,
                    api_key: None,
                    base_url: None,
                };
                Self::create(provider_name, &fallback)
            }
            None => Err(ProviderError::UnknownProvider(format!(
                "default provider '{}' not found in configuration",
                provider_name
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic", "ollama"]
    }
}
