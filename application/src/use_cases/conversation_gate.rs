//! Per-conversation turn serialization.
//!
//! Turns of one conversation must not interleave: each one reads, mutates and
//! writes the same dialog stack. [`ConversationGate`] hands out one async
//! mutex per conversation id; turns of different conversations never wait on
//! each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the duration of one turn.
pub type TurnGuard = OwnedMutexGuard<()>;

#[derive(Debug, Default)]
pub struct ConversationGate {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ConversationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other turn of `conversation_id` is running.
    pub async fn acquire(&self, conversation_id: &str) -> TurnGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Entries nobody holds or waits on can go.
            locks.retain(|id, lock| id == conversation_id || Arc::strong_count(lock) > 1);
            locks
                .entry(conversation_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of conversations with a live gate entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}
