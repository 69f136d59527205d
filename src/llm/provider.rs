//! LLM provider configuration and factory.
//!
//! Supports multiple text-generation backends via a tagged enum
//! configuration. Default is a local Ollama server.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::anthropic::{DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_ANTHROPIC_MODEL};
use super::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use super::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use super::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use super::{
    AnthropicProvider, GeminiProvider, LlmProvider, NoopLlmProvider, OllamaProvider,
    OpenAiProvider,
};
use crate::utils::read_toml_file;
use crate::EnigmaError;

/// LLM provider configuration.
///
/// Loaded from `{data_path}/llm.toml` or the `ENIGMA_LLM_PROVIDER` env var.
/// API keys may be left out and supplied through the provider's usual env var.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum LlmProviderConfig {
    /// Local Ollama server (default).
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
    /// Any OpenAI-compatible chat completions endpoint.
    Openai {
        #[serde(default = "default_openai_url")]
        base_url: String,
        #[serde(default = "default_openai_model")]
        model: String,
        /// Falls back to `OPENAI_API_KEY`
        #[serde(default)]
        api_key: Option<String>,
    },
    /// Google Gemini with an API key.
    Gemini {
        #[serde(default = "default_gemini_url")]
        base_url: String,
        #[serde(default = "default_gemini_model")]
        model: String,
        /// Falls back to `GEMINI_API_KEY`
        #[serde(default)]
        api_key: Option<String>,
    },
    /// Anthropic Messages API.
    Anthropic {
        #[serde(default = "default_anthropic_url")]
        base_url: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        /// Falls back to `ANTHROPIC_API_KEY`
        #[serde(default)]
        api_key: Option<String>,
    },
    /// No generation; characters answer with a fixed apology.
    Disabled,
}

fn default_ollama_url() -> String {
    std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string())
}

fn default_ollama_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string())
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_gemini_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_anthropic_url() -> String {
    DEFAULT_ANTHROPIC_BASE_URL.to_string()
}

fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_string()
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self::Ollama {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

/// Load LLM provider config with priority:
/// 1. `{data_path}/llm.toml` file
/// 2. `ENIGMA_LLM_PROVIDER` env var (JSON)
/// 3. Default (Ollama on localhost, honoring `OLLAMA_BASE_URL`/`OLLAMA_MODEL`)
pub fn load_provider_config(data_path: &Path) -> LlmProviderConfig {
    read_toml_file(data_path, "llm.toml")
        .or_else(provider_from_env)
        .unwrap_or_default()
}

fn provider_from_env() -> Option<LlmProviderConfig> {
    let json = std::env::var("ENIGMA_LLM_PROVIDER").ok()?;
    serde_json::from_str(&json)
        .inspect(|_| info!("Using LLM provider from ENIGMA_LLM_PROVIDER"))
        .inspect_err(|e| warn!("Ignoring ENIGMA_LLM_PROVIDER: {}", e))
        .ok()
}

fn resolve_key(configured: &Option<String>, env_var: &str) -> Result<String, EnigmaError> {
    configured
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            EnigmaError::Validation(format!(
                "No API key configured: set `api_key` in llm.toml or the {env_var} env var"
            ))
        })
}

/// Create a provider from configuration.
pub fn create_llm_provider(
    config: &LlmProviderConfig,
) -> Result<Arc<dyn LlmProvider>, EnigmaError> {
    let provider: Arc<dyn LlmProvider> = match config {
        LlmProviderConfig::Ollama { base_url, model } => {
            Arc::new(OllamaProvider::new(base_url, model))
        }
        LlmProviderConfig::Openai {
            base_url,
            model,
            api_key,
        } => {
            let key = resolve_key(api_key, "OPENAI_API_KEY")?;
            Arc::new(OpenAiProvider::new(base_url, model, &key))
        }
        LlmProviderConfig::Gemini {
            base_url,
            model,
            api_key,
        } => {
            let key = resolve_key(api_key, "GEMINI_API_KEY")?;
            Arc::new(GeminiProvider::new(base_url, model, &key))
        }
        LlmProviderConfig::Anthropic {
            base_url,
            model,
            api_key,
        } => {
            let key = resolve_key(api_key, "ANTHROPIC_API_KEY")?;
            Arc::new(AnthropicProvider::new(base_url, model, &key))
        }
        LlmProviderConfig::Disabled => Arc::new(NoopLlmProvider),
    };

    info!(
        "LLM provider: {} (model {})",
        provider.id(),
        provider.model()
    );
    Ok(provider)
}
