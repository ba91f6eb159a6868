//! Inbound turn events.

use serde::{Deserialize, Serialize};

/// Addresses one user inside one conversation.
///
/// Dialog state is keyed by `conversation_id`; order state by both ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationRef {
    pub conversation_id: String,
    pub user_id: String,
}

impl ConversationRef {
    pub fn new(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Storage key for per-user state in this conversation.
    pub fn user_key(&self) -> String {
        format!("{}/{}", self.conversation_id, self.user_id)
    }
}

impl std::fmt::Display for ConversationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_key())
    }
}

/// One inbound event delivered to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    /// A user said something.
    Message {
        conversation: ConversationRef,
        text: String,
    },
    /// Participants joined the conversation.
    ConversationUpdate {
        conversation_id: String,
        /// The bot's own participant id in this conversation.
        recipient_id: String,
        members_added: Vec<String>,
    },
    /// Any other event kind (typing, reactions, ...); ignored.
    Other { kind: String },
}

impl Activity {
    pub fn message(conversation: ConversationRef, text: impl Into<String>) -> Self {
        Activity::Message {
            conversation,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Activity::Message { .. } => "message",
            Activity::ConversationUpdate { .. } => "conversation_update",
            Activity::Other { kind } => kind,
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Activity::Message { conversation, .. } => Some(&conversation.conversation_id),
            Activity::ConversationUpdate {
                conversation_id, ..
            } => Some(conversation_id),
            Activity::Other { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_key_combines_ids() {
        let conv = ConversationRef::new("c1", "u1");
        assert_eq!(conv.user_key(), "c1/u1");
        assert_eq!(conv.to_string(), "c1/u1");
    }

    #[test]
    fn activity_kinds() {
        let msg = Activity::message(ConversationRef::new("c1", "u1"), "hi");
        assert_eq!(msg.kind(), "message");
        assert_eq!(msg.conversation_id(), Some("c1"));

        let other = Activity::Other {
            kind: "typing".to_string(),
        };
        assert_eq!(other.kind(), "typing");
        assert_eq!(other.conversation_id(), None);
    }

    #[test]
    fn activity_serde_is_tagged() {
        let update = Activity::ConversationUpdate {
            conversation_id: "c1".to_string(),
            recipient_id: "bot".to_string(),
            members_added: vec!["u1".to_string()],
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "conversation_update");
        let back: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(back, update);
    }
}
