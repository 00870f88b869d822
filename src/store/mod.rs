pub mod memory;

pub use memory::InMemorySessionStore;

use crate::models::Session;
use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::OwnedMutexGuard;

/// Exclusive handle on one sender's session. `None` means no session.
///
/// Holding the slot serializes every other access for the same sender;
/// other senders are unaffected.
pub type SessionSlot = OwnedMutexGuard<Option<Session>>;

/// Per-sender conversation state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Lock the sender's slot for a read-modify-write transition.
    async fn checkout(&self, sender_id: &str) -> SessionSlot;

    /// Drop sessions idle for longer than `max_idle` along with unused slots.
    /// Returns the number of slots removed.
    async fn prune(&self, max_idle: Duration) -> usize;

    async fn get(&self, sender_id: &str) -> Option<Session> {
        self.checkout(sender_id).await.clone()
    }

    async fn put(&self, sender_id: &str, session: Session) {
        *self.checkout(sender_id).await = Some(session);
    }

    async fn remove(&self, sender_id: &str) {
        self.checkout(sender_id).await.take();
    }
}
