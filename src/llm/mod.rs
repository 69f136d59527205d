//! Text generation over interchangeable HTTP providers.
//!
//! `LlmProvider` is the seam dialogue generation talks to. Each provider
//! turns a `GenerationRequest` into one HTTP call and hands back plain text;
//! which one is active comes from `provider::load_provider_config`.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod provider;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::EnigmaError;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{create_llm_provider, load_provider_config, LlmProviderConfig};

/// Requests that take longer than this are abandoned.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A single prompt to complete.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 500,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Service trait for prompt completion.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider identifier (`ollama`, `openai`, ...).
    fn id(&self) -> &str;

    /// Model name sent with each request.
    fn model(&self) -> &str;

    /// Complete the prompt and return the generated text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, EnigmaError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Provider used when generation is switched off.
pub struct NoopLlmProvider;

#[async_trait]
impl LlmProvider for NoopLlmProvider {
    fn id(&self) -> &str {
        "disabled"
    }

    fn model(&self) -> &str {
        "none"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<String, EnigmaError> {
        Err(EnigmaError::Llm {
            provider: "disabled".to_string(),
            message: "text generation is disabled".to_string(),
        })
    }

    fn is_available(&self) -> bool {
        false
    }
}

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a prepared request and decode the JSON body, mapping failures to
/// `EnigmaError::Llm` for `provider`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
) -> Result<T, EnigmaError> {
    let llm_error = |message: String| EnigmaError::Llm {
        provider: provider.to_string(),
        message,
    };

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            llm_error("request timed out".to_string())
        } else {
            llm_error(format!("request failed: {e}"))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(llm_error(format!("HTTP {}: {}", status.as_u16(), body)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| llm_error(format!("invalid response body: {e}")))
}

pub(crate) fn empty_completion(provider: &str) -> EnigmaError {
    EnigmaError::Llm {
        provider: provider.to_string(),
        message: "response contained no text".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults() {
        let request = GenerationRequest::new("hi");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.top_p, 0.9);
        assert_eq!(request.max_tokens, 500);
        assert!(request.system.is_none());
    }

    #[tokio::test]
    async fn test_noop_provider_refuses() {
        let provider = NoopLlmProvider;
        assert!(!provider.is_available());
        let err = provider
            .generate(GenerationRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, EnigmaError::Llm { .. }));
    }
}
