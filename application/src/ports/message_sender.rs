//! Message sender port
//!
//! Delivers outbound messages back to the user's channel.

use async_trait::async_trait;
use orderbot_domain::{ConversationRef, OutboundMessage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Outbound channel for a conversation
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send one message. Messages of a turn are sent in order.
    async fn send(
        &self,
        conversation: &ConversationRef,
        message: &OutboundMessage,
    ) -> Result<(), SendError>;
}
