//! The device manager that owns endpoints.

use super::sessions::SessionRef;

/// Owner of the set of devices.
///
/// Endpoints hold only a weak reference to it; the manager is expected to
/// outlive every endpoint it creates.
pub trait DeviceManager: Send + Sync {
    /// Called exactly once for each session added to an endpoint's registry.
    fn on_session_created(&self, session: SessionRef);
}
