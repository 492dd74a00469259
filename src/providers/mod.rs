mod anthropic;
mod factory;
mod ollama;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;

use async_trait::async_trait;
use log::debug;
use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::error::ProviderError;

/// Unified trait for all text-generation providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Run one system + user prompt and return the raw text reply
    async fn complete(&self, system_prompt: &str, content: &str) -> Result<String, ProviderError>;
}

/// Reads a provider response body, mapping 429 to `RateLimited` and other
/// non-success statuses to `Api`.
pub(crate) async fn read_json(response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body: Value = response.json().await?;
    debug!("{:?}", body);

    // Some OpenAI-compatible servers report rate limits inside a 200 body
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .or_else(|| error["message"].as_str())
            .unwrap_or("Unknown error")
            .to_string();
        if error["code"].as_str() == Some("rate_limit_exceeded") {
            return Err(ProviderError::RateLimited);
        }
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}
