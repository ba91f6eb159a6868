//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown sequence: {0}")]
    UnknownSequence(String),

    #[error("Step index {index} out of range for sequence {sequence}")]
    StepOutOfRange { sequence: String, index: usize },

    #[error("Sequence {0} did not settle on a prompt or an end")]
    RunawaySequence(String),

    #[error("Invalid intent label: {0}")]
    InvalidIntent(String),
}

impl DomainError {
    /// Check if this error means the persisted dialog state no longer matches
    /// the registered sequences
    pub fn is_stale_dialog(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownSequence(_) | DomainError::StepOutOfRange { .. }
        )
    }
}
