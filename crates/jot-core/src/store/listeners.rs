//! Subscriber bookkeeping shared by the store adapters.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use super::{lock, Listener, StoreEvent};

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// Set of live listeners for one collection.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; it stays registered until the returned guard drops.
    pub fn register(&self, listener: Listener) -> Subscription {
        let mut registry = lock(&self.inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, listener);
        tracing::debug!("Registered listener {id}");

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Listeners are called after the registry lock is released, so a
    /// listener may subscribe or cancel from inside its callback.
    pub fn broadcast(&self, event: &StoreEvent) {
        let listeners: Vec<Listener> = lock(&self.inner).listeners.values().cloned().collect();
        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a registered listener. Dropping it cancels the subscription.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Stop receiving deliveries.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the listener is still registered with a live store.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| lock(&registry).listeners.contains_key(&self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if lock(&registry).listeners.remove(&self.id).is_some() {
                tracing::debug!("Cancelled listener {}", self.id);
            }
        }
    }
}
