use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::store::PermissionStore;

struct Registered {
    store: Arc<PermissionStore>,
    last_seen: Instant,
}

impl Registered {
    fn new(store: Arc<PermissionStore>) -> Self {
        Self {
            store,
            last_seen: Instant::now(),
        }
    }
}

/// Live permission stores, one per signed-in browser session.
///
/// The browser session only holds the opaque key; the store itself never leaves
/// the process. Every lookup marks the entry as used, and entries idle for longer
/// than the session inactivity window are evicted by [`PermissionStores::spawn_sweeper`],
/// so stores of expired sessions do not accumulate.
#[derive(Default)]
pub struct PermissionStores {
    stores: DashMap<Uuid, Registered>,
}

impl PermissionStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Uuid) -> Option<Arc<PermissionStore>> {
        self.stores.get_mut(key).map(|mut entry| {
            entry.last_seen = Instant::now();
            entry.store.clone()
        })
    }

    /// Store registered under `key`, creating it with `create` when absent.
    ///
    /// The flag is true only for the caller whose store was inserted.
    pub fn get_or_insert_with(
        &self,
        key: Uuid,
        create: impl FnOnce() -> Arc<PermissionStore>,
    ) -> (Arc<PermissionStore>, bool) {
        match self.stores.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.last_seen = Instant::now();
                (entry.store.clone(), false)
            }
            Entry::Vacant(vacant) => {
                let store = create();
                vacant.insert(Registered::new(store.clone()));
                (store, true)
            }
        }
    }

    pub fn remove(&self, key: &Uuid) -> Option<Arc<PermissionStore>> {
        self.stores.remove(key).map(|(_, entry)| entry.store)
    }

    /// Drop every store not used within `max_idle`. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.stores.retain(|_, entry| {
            let keep = entry.last_seen.elapsed() < max_idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Periodically evict stores idle for longer than `max_idle`.
    pub fn spawn_sweeper(
        stores: Arc<Self>,
        max_idle: Duration,
        every: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = stores.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::info!(
                        evicted,
                        remaining = stores.len(),
                        "Evicted idle permission stores"
                    );
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
