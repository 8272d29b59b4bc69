use marketai_provider::InferenceError;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::retry::RetryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// The provider rejected the call and retrying would not help.
    #[error("model request failed: {0}")]
    Request(InferenceError),
    #[error("model service still unavailable after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: InferenceError },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl AssistantError {
    /// True when the failure is about upstream capacity rather than the
    /// request or configuration; callers use it to suggest trying later.
    pub fn is_capacity_problem(&self) -> bool {
        match self {
            Self::RetriesExhausted { .. } => true,
            Self::Request(err) => err.is_transient(),
            Self::Decode(_) => false,
        }
    }

    pub fn inference_error(&self) -> Option<&InferenceError> {
        match self {
            Self::Request(err) | Self::RetriesExhausted { last: err, .. } => Some(err),
            Self::Decode(_) => None,
        }
    }
}

impl From<RetryError<InferenceError>> for AssistantError {
    fn from(err: RetryError<InferenceError>) -> Self {
        match err {
            RetryError::Permanent(err) => Self::Request(err),
            RetryError::Exhausted { attempts, last } => Self::RetriesExhausted { attempts, last },
        }
    }
}
