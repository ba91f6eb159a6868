//! Intent classifier adapters
//!
//! Implementations of the [`IntentClassifier`] port:
//!
//! - [`KeywordClassifier`] — offline regular-expression matching (default)
//! - [`LuisClassifier`] — LUIS v3 prediction endpoint
//! - [`CluClassifier`] — Conversational Language Understanding

mod clu;
mod keyword;
mod luis;

pub use clu::CluClassifier;
pub use keyword::KeywordClassifier;
pub use luis::LuisClassifier;

use crate::config::{ConfigValidationError, FileNluConfig, NluProvider};
use orderbot_application::ports::intent_classifier::{ClassifierError, IntentClassifier};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors building a classifier from configuration
#[derive(Error, Debug)]
pub enum NluSetupError {
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    #[error("Could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Build the classifier selected by `[nlu] provider`.
pub fn build_classifier(
    config: &FileNluConfig,
) -> Result<Arc<dyn IntentClassifier>, NluSetupError> {
    config.validate()?;
    let provider = config.parse_provider()?;
    let timeout = Duration::from_secs(config.timeout_seconds.max(1));
    // validate() guarantees the settings the chosen provider reads.
    let setting = |value: &Option<String>| value.clone().unwrap_or_default();

    let classifier: Arc<dyn IntentClassifier> = match provider {
        NluProvider::Keyword => Arc::new(KeywordClassifier::new(&config.keyword.menu)?),
        NluProvider::Luis => Arc::new(LuisClassifier::new(
            &setting(&config.endpoint),
            &setting(&config.app_id),
            &config.slot,
            setting(&config.api_key),
            timeout,
        )?),
        NluProvider::Clu => Arc::new(CluClassifier::new(
            &setting(&config.endpoint),
            setting(&config.api_key),
            setting(&config.project),
            setting(&config.deployment),
            timeout,
        )?),
    };

    info!("Using {} intent classifier", classifier.name());
    Ok(classifier)
}

fn map_request_error(error: reqwest::Error) -> ClassifierError {
    ClassifierError::Http(error.to_string())
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClassifierError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClassifierError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await.map_err(map_request_error)?;
    serde_json::from_slice(&body).map_err(|e| ClassifierError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds_keyword_classifier() {
        let classifier = build_classifier(&FileNluConfig::default()).unwrap();
        assert_eq!(classifier.name(), "keyword");
    }

    #[test]
    fn test_incomplete_luis_config_is_rejected() {
        let config = FileNluConfig {
            provider: "luis".to_string(),
            ..Default::default()
        };
        let err = build_classifier(&config).err().unwrap();
        assert!(matches!(
            err,
            NluSetupError::Config(ConfigValidationError::MissingNluSetting { .. })
        ));
    }

    #[test]
    fn test_complete_clu_config_builds() {
        let config = FileNluConfig {
            provider: "clu".to_string(),
            endpoint: Some("https://example.cognitiveservices.azure.com".to_string()),
            api_key: Some("key".to_string()),
            project: Some("pizza".to_string()),
            deployment: Some("production".to_string()),
            ..Default::default()
        };
        assert_eq!(build_classifier(&config).unwrap().name(), "clu");
    }
}
