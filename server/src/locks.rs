//! Per-character mutual exclusion.
//!
//! Every mutation of a character (hunting tick, arena settlement) runs while
//! holding that character's guard, so read-modify-write cycles never overlap.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::entities::CharacterId;

/// Registry size that triggers the first sweep of idle entries
const PRUNE_THRESHOLD: usize = 1024;

struct Registry {
    locks: HashMap<CharacterId, Arc<Mutex<()>>>,
    /// Sweep again once the registry grows to this size
    prune_at: usize,
}

/// Registry of one async mutex per character id.
///
/// Entries nobody holds or waits on are swept as the registry grows, so it
/// stays proportional to the number of characters in use.
pub struct CharacterLocks {
    registry: Mutex<Registry>,
}

impl Default for CharacterLocks {
    fn default() -> Self {
        Self {
            registry: Mutex::new(Registry { locks: HashMap::new(), prune_at: PRUNE_THRESHOLD }),
        }
    }
}

impl CharacterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn handle(&self, id: CharacterId) -> Arc<Mutex<()>> {
        let mut registry = self.registry.lock().await;
        if registry.locks.len() >= registry.prune_at {
            // Handles are only cloned under the registry lock, so a count of
            // one means no guard or waiter exists for that id
            registry.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            registry.prune_at = (registry.locks.len() * 2).max(PRUNE_THRESHOLD);
        }
        registry.locks.entry(id).or_default().clone()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.registry.lock().await.locks.len()
    }

    /// Wait for exclusive access to one character
    pub async fn lock(&self, id: CharacterId) -> OwnedMutexGuard<()> {
        self.handle(id).await.lock_owned().await
    }

    /// Lock two distinct characters in ascending id order
    pub async fn lock_pair(&self, a: CharacterId, b: CharacterId) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b, "a character cannot be paired with itself");
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let first_guard = self.lock(first).await;
        let second_guard = self.lock(second).await;
        (first_guard, second_guard)
    }
}
