//! Audio sessions routed through one endpoint.
//!
//! How sessions are discovered and grouped is the registry owner's business;
//! the endpoint only observes the collection.

use crate::observable::{Observers, Subscription};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One per-application audio stream.
pub trait AudioDeviceSession: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn display_name(&self) -> String;

    fn process_id(&self) -> u32;
}

pub type SessionRef = Arc<dyn AudioDeviceSession>;

/// A single change to the session collection.
///
/// Every insertion raises exactly one `Added` carrying the one new session.
#[derive(Debug, Clone)]
pub enum SessionChange {
    Added(SessionRef),
    Removed(SessionRef),
}

/// Ordered, observable collection of the sessions on one device.
pub struct SessionRegistry {
    device_id: String,
    sessions: RwLock<Vec<SessionRef>>,
    changes: Observers<SessionChange>,
}

impl SessionRegistry {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            sessions: RwLock::new(Vec::new()),
            changes: Observers::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Current sessions, in insertion order.
    pub fn sessions(&self) -> Vec<SessionRef> {
        self.sessions.read().clone()
    }

    pub fn get(&self, session_id: &str) -> Option<SessionRef> {
        self.sessions
            .read()
            .iter()
            .find(|s| s.id() == session_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Append a session and raise `Added` for it.
    pub fn add(&self, session: SessionRef) {
        debug!(
            device_id = %self.device_id,
            session_id = session.id(),
            "Session added"
        );
        self.sessions.write().push(Arc::clone(&session));
        self.changes.notify(&SessionChange::Added(session));
    }

    /// Remove a session by id and raise `Removed` for it.
    pub fn remove(&self, session_id: &str) -> Option<SessionRef> {
        let removed = {
            let mut sessions = self.sessions.write();
            let index = sessions.iter().position(|s| s.id() == session_id)?;
            sessions.remove(index)
        };
        debug!(device_id = %self.device_id, session_id, "Session removed");
        self.changes.notify(&SessionChange::Removed(Arc::clone(&removed)));
        Some(removed)
    }

    /// Observe add/remove changes. Handlers run on the thread that mutated
    /// the collection.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        self.changes.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.len()
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("device_id", &self.device_id)
            .field("sessions", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::FakeSession;
    use parking_lot::Mutex;

    #[test]
    fn test_add_and_remove_keep_order() {
        let registry = SessionRegistry::new("dev");
        registry.add(FakeSession::new("a", 1));
        registry.add(FakeSession::new("b", 2));
        registry.add(FakeSession::new("c", 3));

        assert!(registry.remove("b").is_some());
        assert!(registry.remove("missing").is_none());

        let ids: Vec<String> = registry.sessions().iter().map(|s| s.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(registry.get("c").map(|s| s.process_id()), Some(3));
    }

    #[test]
    fn test_changes_are_tagged() {
        let registry = SessionRegistry::new("dev");
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&log);
        let _sub = registry.subscribe(move |change| {
            let entry = match change {
                SessionChange::Added(s) => format!("+{}", s.id()),
                SessionChange::Removed(s) => format!("-{}", s.id()),
            };
            sink.lock().push(entry);
        });

        registry.add(FakeSession::new("a", 1));
        registry.remove("a");
        registry.remove("a");

        assert_eq!(*log.lock(), vec!["+a", "-a"]);
    }

    #[test]
    fn test_handler_sees_collection_already_updated() {
        let registry = Arc::new(SessionRegistry::new("dev"));
        let seen_len = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&registry);
        let sink = Arc::clone(&seen_len);
        let _sub = registry.subscribe(move |_| {
            *sink.lock() = weak.upgrade().map(|r| r.len());
        });

        registry.add(FakeSession::new("a", 1));
        assert_eq!(*seen_len.lock(), Some(1));
    }
}
