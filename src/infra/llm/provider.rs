use crate::domain::{GenerationRequest, LlmError};

pub trait LlmProvider: Send + Sync {
    /// One blocking round trip; returns the extracted answer text.
    fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;
}
