use thiserror::Error;
use tracing::warn;

use crate::domain::{ConversationHistory, ConversationMessage, LlmError, TripContext};
use crate::infra::store::{StoreError, UserStore};

use super::GenerationService;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("chat message must not be empty")]
    EmptyMessage,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyMessage => "Type a message before sending.".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: Result<String, LlmError>,
    pub save_error: Option<StoreError>,
}

impl TurnOutcome {
    /// Text as recorded in the transcript; failures use the `[ERROR]: ` form.
    pub fn display_text(&self) -> String {
        match &self.reply {
            Ok(text) => text.clone(),
            Err(error) => error.in_band_message(),
        }
    }

    /// True when the turn failed for a reason that may clear up on its own.
    pub fn can_retry(&self) -> bool {
        self.reply
            .as_ref()
            .is_err_and(|error| error.is_retryable())
    }
}

/// Logged-in user plus their conversation, persisted to the store after every turn.
pub struct ChatSession {
    store: UserStore,
    username: String,
    messages: ConversationHistory,
}

impl ChatSession {
    pub fn login(store: UserStore, username: &str, password: &str) -> Result<Self, StoreError> {
        let messages = store.login(username, password)?;
        Ok(Self {
            store,
            username: username.trim().to_string(),
            messages,
        })
    }

    pub fn register_and_login(
        store: UserStore,
        username: &str,
        password: &str,
    ) -> Result<Self, StoreError> {
        store.register(username, password)?;
        Self::login(store, username, password)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn generate_plan(&mut self, service: &GenerationService, trip: &TripContext) -> TurnOutcome {
        let reply = service.generate(trip, None, &self.messages);
        self.finish_turn(reply)
    }

    pub fn send_message(
        &mut self,
        service: &GenerationService,
        trip: &TripContext,
        text: &str,
    ) -> Result<TurnOutcome, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        self.messages.push(ConversationMessage::user(text));
        if let Err(error) = self.persist() {
            warn!(%error, "failed to save user message");
        }

        // The prompt carries the new line itself, so the history sent excludes it.
        let earlier = &self.messages[..self.messages.len() - 1];
        let reply = service.generate(trip, Some(text), earlier);

        Ok(self.finish_turn(reply))
    }

    fn finish_turn(&mut self, reply: Result<String, LlmError>) -> TurnOutcome {
        let mut outcome = TurnOutcome {
            reply,
            save_error: None,
        };

        self.messages
            .push(ConversationMessage::assistant(outcome.display_text()));
        outcome.save_error = self.persist().err();
        outcome
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save_history(&self.username, &self.messages)
    }
}
