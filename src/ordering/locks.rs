use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One async mutex per collection name.
///
/// Reorders of the same collection run one after the other; the last one
/// to commit decides the final order.
#[derive(Clone, Default)]
pub struct CollectionLocks {
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl CollectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for a collection, creating it on first use
    pub async fn lock_for(&self, collection: &str) -> Arc<Mutex<()>> {
        // Fast path: try read lock
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(collection) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks.entry(collection.to_string()).or_default().clone()
    }
}
