//! State store adapters
//!
//! - [`MemoryStateStore`] — process-local maps behind `tokio::sync::RwLock`
//! - [`FileStateStore`] — one JSON file per key, locked to one process

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use crate::config::{ConfigValidationError, FileStoreConfig, StoreBackend};
use orderbot_application::ports::state_store::{StateStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors building a state store from configuration
#[derive(Error, Debug)]
pub enum StoreSetupError {
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    #[error("Could not open state store: {0}")]
    Open(#[from] StoreError),
}

/// Build the store selected by `[store] backend`.
pub fn build_store(
    config: &FileStoreConfig,
) -> Result<Arc<dyn StateStore>, StoreSetupError> {
    let store: Arc<dyn StateStore> = match config.parse_backend()? {
        StoreBackend::Memory => {
            info!("Using in-memory state store");
            Arc::new(MemoryStateStore::new())
        }
        StoreBackend::File => {
            let root = config.resolved_path();
            info!("Using file state store at {}", root.display());
            Arc::new(FileStateStore::open(root)?)
        }
    };
    Ok(store)
}
