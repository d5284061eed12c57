pub mod env;
mod generate_endpoint;
mod prompt_builder;
mod provider;
pub mod response_parsing;

pub use generate_endpoint::{DEFAULT_TIMEOUT, GenerateEndpointProvider, normalize_endpoint_url};
pub use prompt_builder::PromptBuilder;
pub use provider::LlmProvider;
pub use response_parsing::{CANDIDATE_KEYS, extract_text, unquote_json_string};
