//! Slot state for the active order.

use serde::{Deserialize, Serialize};

/// What has been collected so far for the active order (Entity)
///
/// Each slot is write-once: a value that passed validation is never replaced
/// for the rest of the order. The state is thrown away as a whole when the
/// order ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotState {
    pub item_name: Option<String>,
    pub item_quantity: Option<i64>,
}

impl SlotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pre-filled state, e.g. for starting a sequence with known values.
    pub fn with_values(item_name: Option<String>, item_quantity: Option<i64>) -> Self {
        Self {
            item_name,
            item_quantity,
        }
    }

    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }

    pub fn item_quantity(&self) -> Option<i64> {
        self.item_quantity
    }

    pub fn has_item_name(&self) -> bool {
        self.item_name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn has_item_quantity(&self) -> bool {
        self.item_quantity.is_some()
    }

    /// Both slots are filled; the order only needs its summary.
    pub fn is_complete(&self) -> bool {
        self.has_item_name() && self.has_item_quantity()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_item_name() && !self.has_item_quantity()
    }

    /// Store a validated name. Returns `false` if a name was already set.
    pub fn set_item_name(&mut self, name: impl Into<String>) -> bool {
        if self.has_item_name() {
            return false;
        }
        self.item_name = Some(name.into());
        true
    }

    /// Store a validated quantity. Returns `false` if a quantity was already set.
    pub fn set_item_quantity(&mut self, quantity: i64) -> bool {
        if self.has_item_quantity() {
            return false;
        }
        self.item_quantity = Some(quantity);
        true
    }

    /// Render the order confirmation using a `{name}` / `{quantity}` template.
    ///
    /// Returns `None` until the state is complete.
    pub fn summary(&self, template: &str) -> Option<String> {
        match (self.item_name(), self.item_quantity) {
            (Some(name), Some(quantity)) if !name.is_empty() => Some(
                template
                    .replace("{name}", name)
                    .replace("{quantity}", &quantity.to_string()),
            ),
            _ => None,
        }
    }
}
