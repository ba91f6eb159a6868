//! Infrastructure layer for orderbot
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: intent classifiers, state stores, the transcript
//! logger, plus configuration file loading and welcome card templates.

pub mod card;
pub mod config;
pub mod logging;
pub mod nlu;
pub mod store;

// Re-export commonly used types
pub use card::{CardError, default_welcome_card, load_welcome_card};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileNluConfig, FileStoreConfig,
    NluProvider, StoreBackend,
};
pub use logging::JsonlConversationLogger;
pub use nlu::{
    CluClassifier, KeywordClassifier, LuisClassifier, NluSetupError, build_classifier,
};
pub use store::{FileStateStore, MemoryStateStore, StoreSetupError, build_store};
