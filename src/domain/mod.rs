mod errors;
mod trip_contract;

pub use errors::{IN_BAND_ERROR_PREFIX, LlmError, LlmErrorCategory};
pub use trip_contract::{
    ConversationHistory, ConversationMessage, ConversationRole, GenerationRequest,
    INTEREST_OPTIONS, PACE_OPTIONS, TripContext,
};
