//! Ollama generation provider (for local models)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{GenerationProvider, GenerationRequest, GenerationResponse, TokenUsage};
use crate::swarm::config::GenerationConfig;
use crate::swarm::error::{GenerationError, GenerationResult};

/// Client for the Ollama `/api/chat` endpoint
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

impl OllamaProvider {
    /// Create a new Ollama provider from configuration
    pub fn new(config: &GenerationConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Self {
            client: reqwest::Client::new(),
            base_url,
            model: config.model.clone(),
            default_temperature: config.temperature,
            default_max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> GenerationResult<GenerationResponse> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let body = json!({
            "model": request.model.as_ref().unwrap_or(&self.model),
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": request.temperature.or(self.default_temperature),
                "num_predict": request.max_tokens.or(self.default_max_tokens),
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(format!("Failed to parse response: {}", e)))?;

        let usage = match (
            ollama_response.prompt_eval_count,
            ollama_response.eval_count,
        ) {
            (None, None) => None,
            (prompt, completion) => {
                let prompt = prompt.unwrap_or(0);
                let completion = completion.unwrap_or(0);
                Some(TokenUsage {
                    prompt_tokens: prompt,
                    completion_tokens: completion,
                    total_tokens: prompt + completion,
                })
            }
        };

        Ok(GenerationResponse {
            text: ollama_response.message.content,
            usage,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}
