//! Fake adapters for tests (behind the `test-support` feature).

use crate::llm::{LlmClient, LlmError};
use crate::retrieval::{ContextRetriever, RetrievalError};
use crate::roles::SpecialistRole;
use async_trait::async_trait;
use mar_storage::FileIndex;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;

/// Scripted LLM: pops queued responses in order and records every
/// prompt it was given. When the script runs dry it returns the
/// default response.
pub struct FakeLlm {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    default_response: String,
}

impl FakeLlm {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            default_response: "OK".to_string(),
        }
    }

    pub fn with_script(responses: Vec<&str>) -> Self {
        let fake = Self::new();
        for response in responses {
            fake.push_response(response);
        }
        fake
    }

    pub fn default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().push_back(response.into());
    }

    /// All prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

impl Default for FakeLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn call(
        &self,
        prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

/// LLM that always fails. Exercises the engine's recovery paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn call(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        Err(LlmError::Empty)
    }
}

/// Retriever returning a fixed string.
#[derive(Debug, Clone, Default)]
pub struct FakeRetriever {
    pub context: String,
}

impl FakeRetriever {
    pub fn returning(context: impl Into<String>) -> Self {
        Self { context: context.into() }
    }
}

#[async_trait]
impl ContextRetriever for FakeRetriever {
    async fn retrieve(
        &self,
        _step_text: &str,
        _role: SpecialistRole,
        _project_dir: &Path,
        _index: &FileIndex,
        _budget_tokens: usize,
    ) -> Result<String, RetrievalError> {
        Ok(self.context.clone())
    }
}
