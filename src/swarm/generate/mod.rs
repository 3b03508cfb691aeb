//! Generation provider boundary
//!
//! Agent executions are backed by an external text-generation service. This
//! module defines the provider contract and the supported backends:
//! - OpenAI-compatible chat-completions endpoints
//! - Ollama (local models)
//!
//! The engine only consumes whole completions; streaming is not part of this
//! boundary.

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::config::{GenerationConfig, GenerationProviderType};
use super::error::GenerationResult;

/// Trait for generation providers
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;

    /// Produce a completion for the request
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<GenerationResponse>;
}

/// A single generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// User prompt
    pub prompt: String,
    /// Optional system instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion token budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Result of a generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,
    /// Token usage, when the backend reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Create a generation provider from configuration
pub fn create_provider(config: &GenerationConfig) -> GenerationResult<Arc<dyn GenerationProvider>> {
    match config.provider {
        GenerationProviderType::OpenAI => {
            let provider = OpenAiProvider::new(config)?;
            Ok(Arc::new(provider))
        }
        GenerationProviderType::Ollama => {
            let provider = OllamaProvider::new(config);
            Ok(Arc::new(provider))
        }
    }
}
