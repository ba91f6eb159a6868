//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod intent_classifier;
pub mod message_sender;
pub mod state_store;
