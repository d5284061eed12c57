use serde::{Deserialize, Serialize};

use super::LlmError;

pub const INTEREST_OPTIONS: &[&str] = &["Food", "Museums", "Nature", "Night-life"];
pub const PACE_OPTIONS: &[&str] = &["Relaxed", "Normal", "Tight"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripContext {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub interests: Vec<String>,
    pub pace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationRole {
    User,
    Assistant,
}

impl ConversationRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

// Stored histories may carry roles other than user/assistant; only "user" speaks as the user.
impl<'de> Deserialize<'de> for ConversationRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let role = String::deserialize(deserializer)?;
        Ok(if role == "user" {
            Self::User
        } else {
            Self::Assistant
        })
    }
}

fn default_role() -> ConversationRole {
    ConversationRole::User
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    #[serde(default = "default_role")]
    pub role: ConversationRole,
    #[serde(default)]
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::Assistant,
            content: content.into(),
        }
    }
}

pub type ConversationHistory = Vec<ConversationMessage>;

/// Wire body posted to the generate endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::validation("model id must not be empty"));
        }
        if self.stream {
            return Err(LlmError::validation("streaming responses are not supported"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ConversationMessage, ConversationRole, GenerationRequest};
    use crate::domain::LlmError;

    #[test]
    fn generation_request_serializes_wire_fields() {
        let request = GenerationRequest::new("gpt-oss:20b", "plan a trip");
        let encoded = serde_json::to_value(&request).expect("request should serialize");

        assert_eq!(
            encoded,
            json!({"model": "gpt-oss:20b", "prompt": "plan a trip", "stream": false})
        );
    }

    #[test]
    fn generation_request_rejects_blank_model() {
        let error = GenerationRequest::new("  ", "prompt")
            .validate()
            .expect_err("blank model should fail");

        assert!(matches!(
            error,
            LlmError::Validation { message } if message == "model id must not be empty"
        ));
    }

    #[test]
    fn conversation_message_tolerates_unknown_role_and_missing_content() {
        let messages: Vec<ConversationMessage> = serde_json::from_value(json!([
            {"role": "user", "content": "hi"},
            {"role": "system", "content": "ignored role"},
            {"role": "assistant"}
        ]))
        .expect("history should decode");

        assert_eq!(messages[0].role, ConversationRole::User);
        assert_eq!(messages[1].role, ConversationRole::Assistant);
        assert_eq!(messages[2].content, "");
    }

    #[test]
    fn conversation_role_serializes_lowercase() {
        let encoded = serde_json::to_string(&ConversationMessage::assistant("ok"))
            .expect("message should serialize");

        assert_eq!(encoded, r#"{"role":"assistant","content":"ok"}"#);
    }
}
