use thiserror::Error;

pub const IN_BAND_ERROR_PREFIX: &str = "[ERROR]: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorCategory {
    UserActionRequired,
    TemporaryFailure,
    InternalFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("generation endpoint request timed out")]
    Timeout,
    #[error("generation endpoint returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("generation endpoint transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> LlmErrorCategory {
        match self {
            Self::Validation { .. } => LlmErrorCategory::UserActionRequired,
            Self::Http { status, .. } if (400..500).contains(status) && *status != 408 => {
                LlmErrorCategory::UserActionRequired
            }
            Self::Timeout | Self::Transport { .. } | Self::Http { .. } => {
                LlmErrorCategory::TemporaryFailure
            }
            Self::Internal { .. } => LlmErrorCategory::InternalFailure,
        }
    }

    /// Nothing in this crate retries; callers may use this to decide whether
    /// offering "try again" makes sense.
    pub fn is_retryable(&self) -> bool {
        self.category() == LlmErrorCategory::TemporaryFailure
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => {
                format!("Please review the settings: {message}")
            }
            Self::Timeout => {
                "The generation endpoint did not respond in time. Please retry.".to_string()
            }
            Self::Http { status, message } => {
                format!("The generation endpoint rejected the request (HTTP {status}): {message}")
            }
            Self::Transport { message } => {
                format!("Could not reach the generation endpoint. Check the link: {message}")
            }
            Self::Internal { message } => {
                format!("An internal error occurred while generating: {message}")
            }
        }
    }

    /// Legacy inline rendering shown in the chat transcript, e.g. `[ERROR]: ...`.
    pub fn in_band_message(&self) -> String {
        format!("{IN_BAND_ERROR_PREFIX}{self}")
    }
}
