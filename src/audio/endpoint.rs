//! Observable model of a single audio endpoint.
//!
//! `AudioDeviceEndpoint` caches volume, mute and display name, keeps that
//! cache in step with native push notifications, and re-raises changes on
//! the UI thread through a [`Dispatcher`]. Peak level is never cached.
//!
//! The owner must call [`AudioDeviceEndpoint::teardown`] (or drop the
//! endpoint) to revoke the native registration and the session
//! subscription.

use super::device::{peak_to_dbfs, AudioError, EndpointSnapshot, PropertyName, VolumeNotification};
use super::manager::DeviceManager;
use super::native::{
    MeterInfo, NativeDevice, NotifyHandle, PropertyKey, StoreAccess, VolumeCallback,
    VolumeControl,
};
use super::sessions::{SessionChange, SessionRegistry};
use crate::dispatcher::Dispatcher;
use crate::observable::{Observers, Subscription};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
struct Levels {
    volume: f32,
    is_muted: bool,
    /// Set once a native notification has written the cache.
    notified: bool,
}

/// State reachable from native callback threads and dispatched work.
struct Shared {
    id: String,
    levels: Mutex<Levels>,
    dispatcher: Arc<dyn Dispatcher>,
    property_changed: Observers<PropertyName>,
}

impl Shared {
    fn volume_callback(shared: &Arc<Shared>) -> VolumeCallback {
        let shared = Arc::downgrade(shared);
        Arc::new(move |notification: VolumeNotification| {
            if let Some(shared) = shared.upgrade() {
                shared.on_volume_notification(notification);
            }
        })
    }

    /// Runs on a native thread. The cache is written before anything is
    /// queued, so dispatched observers always read the latest values.
    fn on_volume_notification(self: &Arc<Self>, notification: VolumeNotification) {
        {
            let mut levels = self.levels.lock();
            if !notification.volume.is_nan() {
                levels.volume = notification.volume.clamp(0.0, 1.0);
            }
            levels.is_muted = notification.is_muted;
            levels.notified = true;
        }
        debug!(
            device_id = %self.id,
            volume = notification.volume,
            is_muted = notification.is_muted,
            "Volume notification"
        );

        self.raise_on_dispatcher(&[PropertyName::Volume, PropertyName::IsMuted]);
    }

    fn raise_on_dispatcher(self: &Arc<Self>, names: &'static [PropertyName]) {
        let shared = Arc::downgrade(self);
        self.dispatcher.invoke(Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                for name in names {
                    shared.property_changed.notify(name);
                }
            }
        }));
    }
}

/// One native audio device, wrapped for the UI.
pub struct AudioDeviceEndpoint {
    id: String,
    device: RwLock<Arc<dyn NativeDevice>>,
    volume_control: Box<dyn VolumeControl>,
    meter: Box<dyn MeterInfo>,
    display_name: RwLock<String>,
    shared: Arc<Shared>,
    sessions: SessionRegistry,
    notify_handle: Mutex<Option<NotifyHandle>>,
    session_subscription: Mutex<Option<Subscription>>,
}

impl AudioDeviceEndpoint {
    /// Wrap a native device.
    ///
    /// Fails with `DeviceUnavailable` if the volume control or meter cannot be
    /// activated; nothing is registered with the manager in that case.
    pub fn new(
        device: Arc<dyn NativeDevice>,
        manager: &Arc<dyn DeviceManager>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, AudioError> {
        let id = device
            .id()
            .map_err(|e| AudioError::unavailable(format!("reading device id: {e}")))?;
        let volume_control = device.activate_volume()?;
        let meter = device.activate_meter()?;

        let shared = Arc::new(Shared {
            id: id.clone(),
            levels: Mutex::new(Levels {
                volume: 0.0,
                is_muted: false,
                notified: false,
            }),
            dispatcher,
            property_changed: Observers::new(),
        });

        let notify_handle = volume_control.register_notify(Shared::volume_callback(&shared))?;

        let sessions = SessionRegistry::new(id.clone());
        let session_subscription = forward_session_adds(&sessions, manager);

        let levels = match read_levels(volume_control.as_ref()) {
            Ok(levels) => levels,
            Err(e) => {
                if let Err(unregister) = volume_control.unregister_notify(notify_handle) {
                    warn!(device_id = %id, error = %unregister, "Failed to unregister volume notifications");
                }
                return Err(e);
            }
        };
        let levels = {
            let mut cached = shared.levels.lock();
            // A notification delivered during the read is newer than it.
            if !cached.notified {
                *cached = levels;
            }
            *cached
        };

        let endpoint = Self {
            id,
            device: RwLock::new(device),
            volume_control,
            meter,
            display_name: RwLock::new(String::new()),
            shared,
            sessions,
            notify_handle: Mutex::new(Some(notify_handle)),
            session_subscription: Mutex::new(Some(session_subscription)),
        };
        endpoint.read_display_name();

        info!(
            device_id = %endpoint.id,
            name = %endpoint.display_name(),
            volume = levels.volume,
            is_muted = levels.is_muted,
            "Audio endpoint created"
        );
        Ok(endpoint)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> String {
        self.display_name.read().clone()
    }

    /// Cached volume (0.0 to 1.0); no native round-trip.
    pub fn volume(&self) -> f32 {
        self.shared.levels.lock().volume
    }

    /// Set the volume, clamped to 0.0..=1.0.
    ///
    /// A different value is pushed to the device and always leaves the
    /// endpoint unmuted. The same value is a no-op.
    pub fn set_volume(&self, volume: f32) {
        if volume.is_nan() {
            warn!(device_id = %self.id, "Ignoring NaN volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        if self.shared.levels.lock().volume == volume {
            return;
        }

        if let Err(e) = self.volume_control.set_master_volume_scalar(volume) {
            warn!(device_id = %self.id, error = %e, "Set volume failed");
        }
        self.shared.levels.lock().volume = volume;

        self.set_is_muted(false);
    }

    pub fn is_muted(&self) -> bool {
        self.shared.levels.lock().is_muted
    }

    /// Set the mute state; issues a native command only when it changes.
    pub fn set_is_muted(&self, muted: bool) {
        if self.shared.levels.lock().is_muted == muted {
            return;
        }

        if let Err(e) = self.volume_control.set_mute(muted) {
            warn!(device_id = %self.id, error = %e, "Set mute failed");
        }
        self.shared.levels.lock().is_muted = muted;
    }

    /// Toggle the mute state. Returns the new state.
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.is_muted();
        self.set_is_muted(muted);
        muted
    }

    /// Live peak level from the native meter (0.0 to 1.0).
    pub fn peak_value(&self) -> Result<f32, AudioError> {
        self.meter.peak_value()
    }

    /// Live peak level in dBFS (clamped to -60dB to 0dB).
    pub fn peak_dbfs(&self) -> Result<f64, AudioError> {
        self.peak_value().map(peak_to_dbfs)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn snapshot(&self) -> EndpointSnapshot {
        let levels = *self.shared.levels.lock();
        EndpointSnapshot {
            id: self.id.clone(),
            display_name: self.display_name(),
            volume: levels.volume,
            is_muted: levels.is_muted,
        }
    }

    /// Observe property changes. Handlers run on the dispatcher's thread.
    pub fn subscribe_property_changed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&PropertyName) + Send + Sync + 'static,
    {
        self.shared.property_changed.subscribe(handler)
    }

    /// Swap in a fresh native handle for the same device and refresh the
    /// display name. Volume and mute are not re-read.
    pub fn device_properties_changed(&self, device: Arc<dyn NativeDevice>) {
        *self.device.write() = device;
        self.read_display_name();
        self.shared.raise_on_dispatcher(&[PropertyName::DisplayName]);
    }

    /// Revoke the native notification registration and the session
    /// subscription. Safe to call more than once.
    pub fn teardown(&self) {
        let subscription = self.session_subscription.lock().take();
        if let Some(mut subscription) = subscription {
            subscription.release();
        }

        let handle = self.notify_handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = self.volume_control.unregister_notify(handle) {
                warn!(device_id = %self.id, error = %e, "Failed to unregister volume notifications");
            }
            info!(device_id = %self.id, "Audio endpoint torn down");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.notify_handle.lock().is_none() && self.session_subscription.lock().is_none()
    }

    /// Re-read the friendly name. On failure the previous value is kept.
    fn read_display_name(&self) {
        let device = Arc::clone(&*self.device.read());
        match friendly_name(device.as_ref()) {
            Ok(name) => *self.display_name.write() = name,
            Err(e) => {
                warn!(device_id = %self.id, error = %e, "Failed to read display name; keeping previous value")
            }
        }
    }
}

impl Drop for AudioDeviceEndpoint {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for AudioDeviceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDeviceEndpoint")
            .field("id", &self.id)
            .field("display_name", &self.display_name())
            .field("volume", &self.volume())
            .field("is_muted", &self.is_muted())
            .finish()
    }
}

fn read_levels(control: &dyn VolumeControl) -> Result<Levels, AudioError> {
    let volume = control
        .master_volume_scalar()
        .map_err(|e| AudioError::unavailable(format!("reading volume: {e}")))?;
    let is_muted = control
        .mute()
        .map_err(|e| AudioError::unavailable(format!("reading mute: {e}")))?;
    Ok(Levels {
        volume: volume.clamp(0.0, 1.0),
        is_muted,
        notified: false,
    })
}

fn friendly_name(device: &dyn NativeDevice) -> Result<String, AudioError> {
    let store = device.open_property_store(StoreAccess::Read)?;
    let key = PropertyKey::DEVICE_FRIENDLY_NAME;
    store
        .get_value(&key)?
        .into_string()
        .ok_or_else(|| AudioError::PropertyUnavailable {
            key: key.to_string(),
        })
}

fn forward_session_adds(sessions: &SessionRegistry, manager: &Arc<dyn DeviceManager>) -> Subscription {
    let manager: Weak<dyn DeviceManager> = Arc::downgrade(manager);
    let device_id = sessions.device_id().to_string();
    sessions.subscribe(move |change| match change {
        SessionChange::Added(session) => match manager.upgrade() {
            Some(manager) => manager.on_session_created(Arc::clone(session)),
            None => warn!(%device_id, session_id = session.id(), "Device manager gone; session not forwarded"),
        },
        SessionChange::Removed(_) => {}
    })
}
