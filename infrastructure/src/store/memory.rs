//! In-memory state store.

use async_trait::async_trait;
use orderbot_application::ports::state_store::{StateStore, StoreError};
use orderbot_domain::{ConversationRef, DialogStack, SlotState};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local [`StateStore`]; everything is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    orders: RwLock<HashMap<(String, String), SlotState>>,
    dialogs: RwLock<HashMap<String, DialogStack>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn order_key(conversation: &ConversationRef) -> (String, String) {
    (
        conversation.conversation_id.clone(),
        conversation.user_id.clone(),
    )
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_order(
        &self,
        conversation: &ConversationRef,
    ) -> Result<Option<SlotState>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .get(&order_key(conversation))
            .cloned())
    }

    async fn save_order(
        &self,
        conversation: &ConversationRef,
        order: Option<&SlotState>,
    ) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        match order {
            Some(order) => {
                orders.insert(order_key(conversation), order.clone());
            }
            None => {
                orders.remove(&order_key(conversation));
            }
        }
        Ok(())
    }

    async fn load_dialog(&self, conversation_id: &str) -> Result<DialogStack, StoreError> {
        Ok(self
            .dialogs
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_dialog(
        &self,
        conversation_id: &str,
        stack: &DialogStack,
    ) -> Result<(), StoreError> {
        let mut dialogs = self.dialogs.write().await;
        if stack.is_empty() {
            dialogs.remove(conversation_id);
        } else {
            dialogs.insert(conversation_id.to_string(), stack.clone());
        }
        Ok(())
    }
}
