use crate::manifest::{LogoEntry, Manifest};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Change notification delivered to display consumers after a successful
/// update cycle.
#[derive(Clone)]
pub struct ManifestChange {
    pub manifest: Arc<Manifest>,
    pub added: Vec<LogoEntry>,
    pub removed: Vec<LogoEntry>,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

type Listener = Arc<dyn Fn(&ManifestChange) + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`]; pass it back to
/// [`ChangeNotifier::unsubscribe`] to deregister.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
}

/// Explicit observer registry for manifest changes.
///
/// Fan-out is synchronous on the scheduler's single path and fires once per
/// successful update cycle; there is no buffering. A slow listener is
/// expected to read current cache state rather than replay history.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Mutex<HashMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ManifestChange) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap()
            .insert(id, Arc::new(listener));
        Subscription { id }
    }

    /// Deregister; unknown handles (already unsubscribed) are a no-op.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.listeners.lock().unwrap().remove(&subscription.id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn notify(&self, change: &ManifestChange) {
        // Snapshot the registry before invoking so a listener may call
        // subscribe/unsubscribe reentrantly without deadlocking. A listener
        // added during fan-out sees the next notification, not this one.
        let listeners: Vec<Listener> = {
            let guard = self.listeners.lock().unwrap();
            guard.values().cloned().collect()
        };
        debug!(
            listeners = listeners.len(),
            version = %change.manifest.version,
            added = change.added.len(),
            removed = change.removed.len(),
            "dispatching manifest change"
        );
        for listener in &listeners {
            (listener.as_ref())(change);
        }
    }
}
