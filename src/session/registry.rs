//! Listener registry: event name -> ordered callback list.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

/// A registered event listener. Identity (for removal) is the `Arc`
/// pointer, so the caller keeps a clone of the same `Arc` it registered.
pub type EventCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Maps logical event names to their listeners, preserving registration
/// order. A callback appears at most once per event.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, Vec<EventCallback>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `event`. Re-registering the same `Arc` for
    /// the same event is a no-op.
    pub fn add(&mut self, event: &str, callback: EventCallback) {
        let list = self.listeners.entry(event.to_string()).or_default();
        if list.iter().any(|existing| Arc::ptr_eq(existing, &callback)) {
            return;
        }
        list.push(callback);
    }

    /// Remove `callback` from `event` by pointer identity. Removing a
    /// callback that was never added is a no-op.
    pub fn remove(&mut self, event: &str, callback: &EventCallback) {
        if let Some(list) = self.listeners.get_mut(event) {
            list.retain(|existing| !Arc::ptr_eq(existing, callback));
            if list.is_empty() {
                self.listeners.remove(event);
            }
        }
    }

    /// Clone of the listener list for `event`, in registration order.
    ///
    /// Dispatch always iterates such a snapshot, never the live list, so a
    /// callback may add or remove listeners mid-dispatch without skipping
    /// or double-invoking anyone in the current round.
    pub fn snapshot(&self, event: &str) -> Vec<EventCallback> {
        self.listeners.get(event).cloned().unwrap_or_default()
    }

    /// Number of listeners currently registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}
