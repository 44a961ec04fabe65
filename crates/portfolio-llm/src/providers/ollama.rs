//! Ollama provider implementation
//!
//! Implements [`LLMProvider`] against a local Ollama instance's
//! `/api/generate` endpoint. Ollama's generate API takes a single flat
//! prompt, so the conversation is rendered to text before sending; tool
//! calling is not supported. This provider exists for the structured table
//! extraction path, which runs a small local model with a fixed prompt.

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, StopReason,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server (default: "http://localhost:11434")
    pub base_url: String,

    /// Request timeout in seconds (default: 300; local models can be slow)
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    /// Create config from `OLLAMA_BASE_URL` if set, defaults otherwise
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_BASE.to_string());
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Set the server base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Ollama generate-API provider
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a provider with the given configuration
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider against the default local server
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OllamaConfig::from_env())
    }

    /// Get the current configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

/// Flatten the system prompt and conversation into one prompt string
fn render_prompt(request: &CompletionRequest) -> String {
    let mut parts = Vec::new();
    if let Some(system) = &request.system {
        parts.push(system.clone());
    }
    for message in &request.messages {
        if let Some(text) = message.text() {
            parts.push(text.to_string());
        }
    }
    parts.join("\n\n")
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if request.tools.is_some() {
            return Err(LLMError::InvalidRequest(
                "Ollama generate API does not support tool calling".to_string(),
            ));
        }

        let prompt = render_prompt(&request);
        debug!(prompt_len = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.base_url))
            .json(&GenerateRequest {
                model: &request.model,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(match status.as_u16() {
                404 => LLMError::ModelNotFound(request.model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            output_tokens = generate_response.eval_count,
            "Generate response received"
        );

        Ok(CompletionResponse {
            message: Message::assistant(generate_response.response.trim()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: generate_response.prompt_eval_count,
                output_tokens: generate_response.eval_count,
            },
        })
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
