mod chat_session;
mod generation_service;

pub use chat_session::{ChatSession, SessionError, TurnOutcome};
pub use generation_service::{DEFAULT_MODEL_ID, GenerationService};
