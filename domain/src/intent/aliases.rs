//! Provider-agnostic entity lookup.
//!
//! Each NLU provider names its entities differently ("number",
//! "builtin.number", "Quantity", ...). A slot is looked up through an ordered
//! alias list: the first alias present in the result wins, and of its values
//! the first one is taken. Later aliases are not consulted even when the
//! winning value later fails validation.

use super::classification::{ClassifierResult, EntityValue};
use serde::{Deserialize, Serialize};

/// Alias priority lists, one per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAliases {
    pub item_name: Vec<String>,
    pub item_quantity: Vec<String>,
}

impl Default for EntityAliases {
    fn default() -> Self {
        Self {
            item_name: vec![
                "pizza".to_string(),
                "PizzaName".to_string(),
                "Pizza".to_string(),
                "ItemName".to_string(),
            ],
            item_quantity: vec![
                "number".to_string(),
                "builtin.number".to_string(),
                "Quantity".to_string(),
                "quantity".to_string(),
            ],
        }
    }
}

/// Raw slot candidates found in one classifier result (not yet validated).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotCandidates {
    pub item_name: Option<EntityValue>,
    pub item_quantity: Option<EntityValue>,
}

impl SlotCandidates {
    pub fn is_empty(&self) -> bool {
        self.item_name.is_none() && self.item_quantity.is_none()
    }
}

impl EntityAliases {
    pub fn extract(&self, result: &ClassifierResult) -> SlotCandidates {
        SlotCandidates {
            item_name: first_match(&self.item_name, result),
            item_quantity: first_match(&self.item_quantity, result),
        }
    }
}

fn first_match(aliases: &[String], result: &ClassifierResult) -> Option<EntityValue> {
    aliases
        .iter()
        .find_map(|alias| result.entity(alias))
        .and_then(|values| values.first())
        .cloned()
}
