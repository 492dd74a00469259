use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::{read_json, LlmProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| ProviderError::MissingApiKey("ANTHROPIC_API_KEY".to_string()))?;

        Ok(AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.2,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, system_prompt: &str, content: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": system_prompt,
                "messages": [
                    {
                        "role": "user",
                        "content": content
                    }
                ]
            }))
            .send()
            .await?;

        let response_body = read_json(response).await?;
        let text = response_body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| ProviderError::MalformedResponse("missing content[0].text".to_string()))?
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_config() -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "claude-3-5-haiku-latest".to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            api_key: Some("test-key".to_string()),
            base_url: None,
        }
    }

    #[test]
    fn test_provider_from_config() {
        let provider = AnthropicProvider::new(&test_config()).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
        assert_eq!(provider.base_url, "https://api.anthropic.com");
    }

    #[tokio::test]
    async fn test_complete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": [{"type": "text", "text": "COOKING"}]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(
            "test-key".to_string(),
            server.url(),
            "claude-3-5-haiku-latest".to_string(),
        );
        let result = provider.complete("classify", "stir the sauce").await.unwrap();
        assert_eq!(result, "COOKING");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_overloaded_is_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .create_async()
            .await;

        let provider = AnthropicProvider::with_base_url(
            "test-key".to_string(),
            server.url(),
            "claude-3-5-haiku-latest".to_string(),
        );
        let result = provider.complete("classify", "text").await;
        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }
}
