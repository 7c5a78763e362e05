//! Observer lists with revocable subscriptions.
//!
//! Used for session collection changes and endpoint property changes.
//! Handlers run synchronously on whichever thread raised the event.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slots<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// A list of handlers for events of type `T`.
pub struct Observers<T> {
    slots: Arc<Mutex<Slots<T>>>,
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Add a handler. It stays registered until the returned subscription is
    /// released or dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut slots = self.slots.lock();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.handlers.push((id, Arc::new(handler)));
            id
        };

        let slots: Weak<Mutex<Slots<T>>> = Arc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = slots.upgrade() {
                slots.lock().handlers.retain(|(slot, _)| *slot != id);
            }
        })
    }

    /// Invoke every handler with `event`.
    pub fn notify(&self, event: &T) {
        // Snapshot so handlers may (un)subscribe without deadlocking.
        let handlers: Vec<Handler<T>> = self
            .slots
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered handler.
///
/// Releasing is idempotent; dropping releases too.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    revoke: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(revoke: impl FnOnce() + Send + 'static) -> Self {
        Self {
            revoke: Some(Box::new(revoke)),
        }
    }

    pub fn release(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            revoke();
        }
    }

    pub fn is_active(&self) -> bool {
        self.revoke.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
