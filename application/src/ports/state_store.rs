//! State store port
//!
//! Two scopes are persisted: the order slots, keyed per user within a
//! conversation, and the dialog stack, keyed per conversation.

use async_trait::async_trait;
use orderbot_domain::{ConversationRef, DialogStack, SlotState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for per-user order state and per-conversation dialog state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the order slots for `conversation`'s user. `None` means no order.
    async fn load_order(
        &self,
        conversation: &ConversationRef,
    ) -> Result<Option<SlotState>, StoreError>;

    /// Persist the order slots. `None` clears any stored order.
    async fn save_order(
        &self,
        conversation: &ConversationRef,
        order: Option<&SlotState>,
    ) -> Result<(), StoreError>;

    /// Load the dialog stack. A missing entry loads as an empty stack.
    async fn load_dialog(&self, conversation_id: &str) -> Result<DialogStack, StoreError>;

    async fn save_dialog(
        &self,
        conversation_id: &str,
        stack: &DialogStack,
    ) -> Result<(), StoreError>;
}
