//! Error types for the TeamCity spy

use cieye_observation::TransportError;
use thiserror::Error;

/// Content could not be reduced to the canonical shape
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{resource} is missing required field `{field}`")]
    MissingField {
        resource: &'static str,
        field: &'static str,
    },

    #[error("{resource} #{index} has an empty id")]
    EmptyId { resource: &'static str, index: usize },

    #[error("Unrecognised TeamCity timestamp: {value}")]
    InvalidDate { value: String },
}

/// Failure of a communicator operation
#[derive(Error, Debug)]
pub enum CommunicatorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl CommunicatorError {
    pub fn is_transport(&self) -> bool {
        matches!(self, CommunicatorError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, CommunicatorError::Decode(_))
    }
}

/// Result type for decoding
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Result type for communicator operations
pub type Result<T> = std::result::Result<T, CommunicatorError>;
