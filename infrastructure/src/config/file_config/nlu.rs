//! Intent classifier configuration from TOML (`[nlu]` section)

use super::ConfigValidationError;
use orderbot_domain::IntentLabels;
use serde::{Deserialize, Serialize};

/// Supported classifier back ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NluProvider {
    /// Offline keyword and regex matching
    Keyword,
    /// LUIS v3 prediction endpoint
    Luis,
    /// Conversational Language Understanding
    Clu,
}

impl NluProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            NluProvider::Keyword => "keyword",
            NluProvider::Luis => "luis",
            NluProvider::Clu => "clu",
        }
    }
}

impl std::str::FromStr for NluProvider {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "offline" => Ok(NluProvider::Keyword),
            "luis" => Ok(NluProvider::Luis),
            "clu" => Ok(NluProvider::Clu),
            _ => Err(ConfigValidationError::UnknownProvider(s.to_string())),
        }
    }
}

/// `[nlu.keyword]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileKeywordConfig {
    /// Menu items recognized as the `pizza` entity
    pub menu: Vec<String>,
}

impl Default for FileKeywordConfig {
    fn default() -> Self {
        Self {
            menu: ["Margherita", "Funghi", "Hawaii", "Pepperoni", "Quattro Formaggi"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Raw classifier configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNluConfig {
    /// `keyword`, `luis` or `clu`
    pub provider: String,
    /// Service base URL, e.g. `https://<resource>.cognitiveservices.azure.com`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// LUIS application id
    pub app_id: Option<String>,
    /// LUIS slot name
    pub slot: String,
    /// CLU project name
    pub project: Option<String>,
    /// CLU deployment name
    pub deployment: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Provider label tables
    pub intents: IntentLabels,
    pub keyword: FileKeywordConfig,
}

impl Default for FileNluConfig {
    fn default() -> Self {
        Self {
            provider: "keyword".to_string(),
            endpoint: None,
            api_key: None,
            app_id: None,
            slot: "production".to_string(),
            project: None,
            deployment: None,
            timeout_seconds: 10,
            intents: IntentLabels::default(),
            keyword: FileKeywordConfig::default(),
        }
    }
}

impl FileNluConfig {
    pub fn parse_provider(&self) -> Result<NluProvider, ConfigValidationError> {
        self.provider.parse()
    }

    /// Check that the selected provider has every setting it needs.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let provider = self.parse_provider()?;
        let required: Vec<(&'static str, &Option<String>)> = match provider {
            NluProvider::Keyword => vec![],
            NluProvider::Luis => vec![
                ("endpoint", &self.endpoint),
                ("api_key", &self.api_key),
                ("app_id", &self.app_id),
            ],
            NluProvider::Clu => vec![
                ("endpoint", &self.endpoint),
                ("api_key", &self.api_key),
                ("project", &self.project),
                ("deployment", &self.deployment),
            ],
        };

        for (field, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(ConfigValidationError::MissingNluSetting {
                    provider: provider.as_str(),
                    field,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!("LUIS".parse::<NluProvider>(), Ok(NluProvider::Luis));
        assert_eq!("clu".parse::<NluProvider>(), Ok(NluProvider::Clu));
        assert_eq!(
            "watson".parse::<NluProvider>(),
            Err(ConfigValidationError::UnknownProvider("watson".to_string()))
        );
    }

    #[test]
    fn test_luis_requires_app_id() {
        let config = FileNluConfig {
            provider: "luis".to_string(),
            endpoint: Some("https://example.com".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingNluSetting {
                provider: "luis",
                field: "app_id"
            })
        );
    }

    #[test]
    fn test_clu_complete() {
        let config = FileNluConfig {
            provider: "clu".to_string(),
            endpoint: Some("https://example.com".to_string()),
            api_key: Some("key".to_string()),
            project: Some("pizza".to_string()),
            deployment: Some("prod".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_setting_counts_as_missing() {
        let config = FileNluConfig {
            provider: "clu".to_string(),
            endpoint: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingNluSetting {
                field: "endpoint",
                ..
            })
        ));
    }
}
