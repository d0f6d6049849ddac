use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::model::ApplicationState;

pub(crate) type Listener = Arc<dyn Fn(&Arc<ApplicationState>) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

impl ListenerRegistry {
    pub(crate) fn insert(&mut self, listener: Listener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Clones the current listener list so it can be invoked without holding
    /// the registry lock (listeners may subscribe, unsubscribe or mutate).
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

pub(crate) fn lock_registry(registry: &Mutex<ListenerRegistry>) -> MutexGuard<'_, ListenerRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by every store subscription.
///
/// The listener stays registered for as long as the handle lives. Dropping
/// it (or calling [`Subscription::unsubscribe`]) detaches the listener
/// without touching the state.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: &SharedRegistry) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry).remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
