//! State store configuration from TOML (`[store]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local; state is lost on exit
    Memory,
    /// One JSON file per key under `path`
    File,
}

/// Raw store configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// `memory` or `file`
    pub backend: String,
    /// Directory for the file backend
    pub path: Option<PathBuf>,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: None,
        }
    }
}

impl FileStoreConfig {
    pub fn parse_backend(&self) -> Result<StoreBackend, ConfigValidationError> {
        match self.backend.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            _ => Err(ConfigValidationError::UnknownStoreBackend(
                self.backend.clone(),
            )),
        }
    }

    /// Directory for the file backend, defaulting to the user data dir.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("orderbot")
                .join("state")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        let mut config = FileStoreConfig::default();
        assert_eq!(config.parse_backend(), Ok(StoreBackend::Memory));

        config.backend = "File".to_string();
        assert_eq!(config.parse_backend(), Ok(StoreBackend::File));

        config.backend = "redis".to_string();
        assert_eq!(
            config.parse_backend(),
            Err(ConfigValidationError::UnknownStoreBackend(
                "redis".to_string()
            ))
        );
    }

    #[test]
    fn test_explicit_path_wins() {
        let config = FileStoreConfig {
            backend: "file".to_string(),
            path: Some(PathBuf::from("/var/lib/orderbot")),
        };
        assert_eq!(config.resolved_path(), PathBuf::from("/var/lib/orderbot"));
    }
}
