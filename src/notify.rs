//! Change notification.
//!
//! The access layer publishes an event after every effective mutation so
//! dependent views can refresh. Subscriptions are scoped by the exact
//! target written: an item write reaches observers of that item only, not
//! observers of the owning collection. Delivery is fire-and-forget; a
//! subscriber that went away is silently dropped, and publishing to nobody
//! is not an error.
//!
//! Registration and de-registration are the collaborator's responsibility;
//! this hub only keeps the current set and pushes events at it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::router::Target;

/// One data-changed event. Carries the identifier the mutation was
/// addressed to, so the receiver can re-query with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub identifier: String,
    pub target: Target,
}

/// Registry of current observers, keyed by target.
#[derive(Debug, Default)]
pub struct ChangeHub {
    subscribers: Mutex<HashMap<Target, Vec<Sender<ChangeEvent>>>>,
}

impl ChangeHub {
    pub fn new() -> ChangeHub {
        ChangeHub::default()
    }

    /// Register an observer for `target`. Dropping the receiver
    /// unsubscribes on the next publish.
    pub fn subscribe(&self, target: Target) -> Receiver<ChangeEvent> {
        let (tx, rx) = channel();
        self.lock().entry(target).or_default().push(tx);
        rx
    }

    /// Push an event at every current observer of `target`.
    pub fn publish(&self, target: Target, identifier: &str) {
        let event = ChangeEvent { identifier: identifier.to_owned(), target };
        let mut subscribers = self.lock();
        if let Some(observers) = subscribers.get_mut(&target) {
            observers.retain(|tx| tx.send(event.clone()).is_ok());
            if observers.is_empty() {
                subscribers.remove(&target);
            }
        }
    }

    /// Number of observers currently registered for `target`. Dropped
    /// receivers still count until the next publish prunes them.
    pub fn observer_count(&self, target: Target) -> usize {
        self.lock().get(&target).map_or(0, Vec::len)
    }

    // A poisoned registry is still structurally sound, so recover it
    // rather than failing a fire-and-forget path.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Target, Vec<Sender<ChangeEvent>>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
