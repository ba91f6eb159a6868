//! Bot configuration — texts, intent labels and entity aliases.
//!
//! [`BotConfig`] groups everything the turn dispatcher needs that is not a
//! port: the user-facing messages, the question/summary texts of the order
//! sequence, the provider label table for intents, and the per-slot entity
//! alias priority lists.

use orderbot_domain::{EntityAliases, IntentLabels, OrderPrompts};
use serde::{Deserialize, Serialize};

/// Fixed replies the dispatcher sends outside of the order sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotMessages {
    /// Cancel intent while a sequence was active.
    pub cancelled: String,
    /// Cancel intent with nothing active.
    pub nothing_to_cancel: String,
    pub help: String,
    /// No active sequence and no intent we route on.
    pub not_understood: String,
    /// The classifier failed or the turn was aborted while classifying.
    pub classifier_unavailable: String,
    /// The dialog stack could not be resumed and was reset.
    pub dialog_reset: String,
}

impl Default for BotMessages {
    fn default() -> Self {
        Self {
            cancelled: "Your order has been canceled.".to_string(),
            nothing_to_cancel: "There is nothing to cancel.".to_string(),
            help: "I can take your pizza order. Tell me which pizza you want and how many \
                   pieces, or say \"cancel\" to start over."
                .to_string(),
            not_understood: "Sorry, I didn't understand that.".to_string(),
            classifier_unavailable:
                "Sorry, I could not understand you right now. Please try again.".to_string(),
            dialog_reset: "Sorry, something went wrong. Let's start over.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub messages: BotMessages,
    pub prompts: OrderPrompts,
    pub intents: IntentLabels,
    pub entities: EntityAliases,
}

impl BotConfig {
    // ==================== Builder Methods ====================

    pub fn with_messages(mut self, messages: BotMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_prompts(mut self, prompts: OrderPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_intents(mut self, intents: IntentLabels) -> Self {
        self.intents = intents;
        self
    }

    pub fn with_entities(mut self, entities: EntityAliases) -> Self {
        self.entities = entities;
        self
    }
}
