//! Outbound messages: plain text or a rich card.

use serde::{Deserialize, Serialize};

/// The single button on a rich card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
    pub title: String,
    pub url: String,
}

/// A hero-style card: title, subtitle, body, image and one link button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichCard {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub button: CardAction,
}

/// Something the bot says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text(String),
    Card(RichCard),
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        OutboundMessage::Text(content.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutboundMessage::Text(s) => Some(s),
            OutboundMessage::Card(_) => None,
        }
    }

    pub fn as_card(&self) -> Option<&RichCard> {
        match self {
            OutboundMessage::Card(card) => Some(card),
            OutboundMessage::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_accessors() {
        let msg = OutboundMessage::text("How many pieces?");
        assert_eq!(msg.as_text(), Some("How many pieces?"));
        assert!(msg.as_card().is_none());
    }

    #[test]
    fn card_deserializes_with_optional_fields_missing() {
        let card: RichCard = serde_json::from_str(
            r#"{"title":"Welcome","button":{"title":"Menu","url":"https://example.com/menu"}}"#,
        )
        .unwrap();
        assert_eq!(card.title, "Welcome");
        assert_eq!(card.subtitle, "");
        assert!(card.image_url.is_none());
        assert_eq!(card.button.url, "https://example.com/menu");
    }
}
