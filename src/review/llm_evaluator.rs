//! Semantic evaluator backed by an [`LlmClient`]

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use super::evaluator::{EvaluationError, SemanticEvaluator, ServiceVerdict};
use super::prompts::{SYSTEM_PROMPT, build_requirement_prompt};
use super::response::parse_verdict;
use crate::checklist::ChecklistRequirement;
use crate::llm::{CompletionRequest, LlmClient};

/// Default token budget for one verdict
pub const DEFAULT_VERDICT_TOKENS: u32 = 1024;

/// Asks an LLM for a JSON verdict per requirement
pub struct LlmEvaluator {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmEvaluator {
    /// Create an evaluator over the given client
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_VERDICT_TOKENS,
            temperature: 0.0,
        }
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set max tokens per verdict
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request(&self, requirement: &ChecklistRequirement, document_text: &str) -> CompletionRequest {
        CompletionRequest::new(self.system_prompt.clone())
            .with_user_message(build_requirement_prompt(requirement, document_text))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }
}

#[async_trait]
impl SemanticEvaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        requirement: &ChecklistRequirement,
        document_text: &str,
    ) -> Result<ServiceVerdict, EvaluationError> {
        let request = self.build_request(requirement, document_text);
        let response = self.client.complete(request).await?;

        debug!(
            "LLM verdict for {}: {} tokens in, {} out",
            requirement.id, response.usage.input_tokens, response.usage.output_tokens
        );
        if response.stop_reason.is_truncated() {
            warn!("LLM response for {} hit the token limit", requirement.id);
        }

        parse_verdict(&response.content)
    }

    fn description(&self) -> &str {
        self.client.model()
    }
}
