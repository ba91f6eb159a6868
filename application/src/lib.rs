//! Application layer for orderbot
//!
//! This crate contains the turn dispatcher use case, port definitions, and
//! bot configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BotConfig, BotMessages};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    intent_classifier::{ClassifierError, IntentClassifier},
    message_sender::{MessageSender, SendError},
    state_store::{StateStore, StoreError},
};
pub use use_cases::conversation_gate::ConversationGate;
pub use use_cases::process_turn::{ProcessTurnUseCase, TurnError, TurnReport};
