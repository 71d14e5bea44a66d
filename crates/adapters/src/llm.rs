//! LLM client trait and the default OpenAI-compatible HTTP client.
//!
//! The engine supplies no retry of its own on network errors; endpoint
//! concerns (auth, streaming, retries) belong to the implementation.

use async_trait::async_trait;
use mar_core::LlmConfig;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors from an LLM call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(String),
    #[error("llm returned status {0}")]
    Status(u16),
    #[error("llm response was empty")]
    Empty,
    #[error("llm response was malformed: {0}")]
    Malformed(String),
}

/// The one call the engine makes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn call(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint (LM Studio,
/// llama.cpp server, vLLM).
pub struct HttpLlm {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlm {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmClient for HttpLlm {
    async fn call(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LlmError::Empty);
        }
        Ok(content)
    }
}
