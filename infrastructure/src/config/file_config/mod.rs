//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod nlu;
mod store;

pub use nlu::{FileKeywordConfig, FileNluConfig, NluProvider};
pub use store::{FileStoreConfig, StoreBackend};

use orderbot_application::{BotConfig, BotMessages};
use orderbot_domain::{EntityAliases, OrderPrompts};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("unknown nlu.provider '{0}' (expected keyword, luis or clu)")]
    UnknownProvider(String),

    #[error("nlu.{field} is required for the {provider} provider")]
    MissingNluSetting {
        provider: &'static str,
        field: &'static str,
    },

    #[error("entities.{0} must list at least one entity name")]
    EmptyAliases(&'static str),

    #[error("unknown store.backend '{0}' (expected memory or file)")]
    UnknownStoreBackend(String),

    #[error("bot.id cannot be empty")]
    EmptyBotId,
}

/// `[bot]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBotConfig {
    /// The bot's own participant id; never greeted on join.
    pub id: String,
}

impl Default for FileBotConfig {
    fn default() -> Self {
        Self {
            id: "orderbot".to_string(),
        }
    }
}

/// `[welcome]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWelcomeConfig {
    /// JSON card template; the built-in card is used when unset.
    pub card: Option<PathBuf>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript file; no transcript when unset.
    pub transcript: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bot: FileBotConfig,
    /// Intent classifier provider settings
    pub nlu: FileNluConfig,
    /// Entity alias priority lists per slot
    pub entities: EntityAliases,
    /// Dispatcher texts
    pub messages: BotMessages,
    /// Order questions and summary format
    pub prompts: OrderPrompts,
    pub store: FileStoreConfig,
    pub welcome: FileWelcomeConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.bot.id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBotId);
        }
        self.nlu.validate()?;
        if self.entities.item_name.is_empty() {
            return Err(ConfigValidationError::EmptyAliases("item_name"));
        }
        if self.entities.item_quantity.is_empty() {
            return Err(ConfigValidationError::EmptyAliases("item_quantity"));
        }
        self.store.parse_backend()?;
        Ok(())
    }

    /// Application-level bot configuration
    pub fn to_bot_config(&self) -> BotConfig {
        BotConfig::default()
            .with_messages(self.messages.clone())
            .with_prompts(self.prompts.clone())
            .with_intents(self.nlu.intents.clone())
            .with_entities(self.entities.clone())
    }
}
