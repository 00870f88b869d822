use super::{SessionSlot, SessionStore};
use crate::models::Session;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Slot = Arc<tokio::sync::Mutex<Option<Session>>>;

/// Process-local session store with one async mutex per sender.
///
/// The outer map lock is only held to find or create a slot, never across an
/// await, so a slow transition for one sender does not block anyone else.
/// Sessions do not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, sender_id: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(sender_id.to_string()).or_default().clone()
    }

    /// Number of per-sender slots currently allocated.
    pub fn slot_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn checkout(&self, sender_id: &str) -> SessionSlot {
        self.slot(sender_id).lock_owned().await
    }

    async fn prune(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();

        slots.retain(|_, slot| {
            // Someone else holds or is about to lock this slot
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(session) => session
                    .as_ref()
                    .is_some_and(|s| !s.is_idle_since(cutoff)),
                Err(_) => true,
            }
        });

        let removed = before - slots.len();
        if removed > 0 {
            tracing::debug!("Pruned {} idle session slots", removed);
        }
        removed
    }
}
