//! Configuration file loading for orderbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `ORDERBOT_*` (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./orderbot.toml` or `./.orderbot.toml`
//! 4. Global: `$XDG_CONFIG_HOME/orderbot/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBotConfig, FileConfig, FileKeywordConfig, FileLoggingConfig,
    FileNluConfig, FileStoreConfig, FileWelcomeConfig, NluProvider, StoreBackend,
};
pub use loader::ConfigLoader;
