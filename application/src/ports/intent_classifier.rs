//! Intent classifier port
//!
//! Defines the interface for the natural-language understanding service that
//! turns an utterance into a top intent plus extracted entities.

use async_trait::async_trait;
use orderbot_domain::ClassifierResult;
use thiserror::Error;

/// Errors that can occur while classifying an utterance
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode classifier response: {0}")]
    Decode(String),

    #[error("Classifier error: {0}")]
    Other(String),
}

/// Natural-language classifier
///
/// Implementations (adapters) live in the infrastructure layer. Returned
/// intent labels are provider names; the dispatcher maps them through
/// [`IntentLabels`](orderbot_domain::IntentLabels).
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Classify a single utterance
    async fn classify(&self, utterance: &str) -> Result<ClassifierResult, ClassifierError>;
}
