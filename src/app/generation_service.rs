use std::sync::Arc;

use tracing::debug;

use crate::domain::{ConversationMessage, GenerationRequest, LlmError, TripContext};
use crate::infra::llm::{LlmProvider, PromptBuilder};

pub const DEFAULT_MODEL_ID: &str = "gpt-oss:20b";

#[derive(Clone)]
pub struct GenerationService {
    provider: Arc<dyn LlmProvider>,
    model_id: String,
}

impl GenerationService {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_model(provider, DEFAULT_MODEL_ID)
    }

    pub fn with_model(provider: Arc<dyn LlmProvider>, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into().trim().to_string(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Builds a chat prompt when `user_message` is non-empty, otherwise the
    /// initial plan prompt, and sends it in a single blocking attempt.
    pub fn generate(
        &self,
        trip: &TripContext,
        user_message: Option<&str>,
        history: &[ConversationMessage],
    ) -> Result<String, LlmError> {
        let prompt = match user_message.filter(|message| !message.is_empty()) {
            Some(message) => {
                debug!(history_len = history.len(), "building chat prompt");
                PromptBuilder::chat(trip, message, history)
            }
            None => {
                debug!("building plan prompt");
                PromptBuilder::plan(trip)
            }
        };

        let request = GenerationRequest::new(self.model_id.clone(), prompt);
        self.provider.generate(&request)
    }
}
