//! Recording fakes for the native boundary and collaborators.

use super::device::{AudioError, VolumeNotification};
use super::manager::DeviceManager;
use super::native::{
    MeterInfo, NativeDevice, NotifyHandle, PropertyKey, PropertyStore, PropertyValue,
    StoreAccess, VolumeCallback, VolumeControl,
};
use super::sessions::{AudioDeviceSession, SessionRef};
use crate::dispatcher::{Dispatcher, Work};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Native commands issued against a fake device.
#[derive(Debug, Clone, Default)]
pub struct NativeCalls {
    pub set_volume: Vec<f32>,
    pub set_mute: Vec<bool>,
    pub peak_reads: usize,
    pub store_opens: usize,
    pub unregistered: Vec<NotifyHandle>,
}

struct FakeState {
    volume: f32,
    muted: bool,
    peak: f32,
    friendly_name: Option<String>,
    volume_available: bool,
    meter_available: bool,
    store_available: bool,
    next_handle: u64,
    callbacks: HashMap<u64, VolumeCallback>,
    notify_on_read: Option<VolumeNotification>,
    calls: NativeCalls,
}

/// A native device whose handles share one recorded state.
#[derive(Clone)]
pub struct FakeDevice {
    id: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeDevice {
    pub fn new(id: &str, name: &str, volume: f32, muted: bool) -> Self {
        Self {
            id: id.to_string(),
            state: Arc::new(Mutex::new(FakeState {
                volume,
                muted,
                peak: 0.0,
                friendly_name: Some(name.to_string()),
                volume_available: true,
                meter_available: true,
                store_available: true,
                next_handle: 1,
                callbacks: HashMap::new(),
                notify_on_read: None,
                calls: NativeCalls::default(),
            })),
        }
    }

    pub fn handle(&self) -> Arc<dyn NativeDevice> {
        Arc::new(self.clone())
    }

    pub fn calls(&self) -> NativeCalls {
        self.state.lock().calls.clone()
    }

    pub fn set_peak(&self, peak: f32) {
        self.state.lock().peak = peak;
    }

    pub fn set_friendly_name(&self, name: Option<&str>) {
        self.state.lock().friendly_name = name.map(str::to_string);
    }

    pub fn set_volume_available(&self, available: bool) {
        self.state.lock().volume_available = available;
    }

    pub fn set_meter_available(&self, available: bool) {
        self.state.lock().meter_available = available;
    }

    pub fn set_store_available(&self, available: bool) {
        self.state.lock().store_available = available;
    }

    /// The next volume read fires this notification to every registered
    /// callback, then returns the value held before it.
    pub fn notify_during_volume_read(&self, volume: f32, is_muted: bool) {
        self.state.lock().notify_on_read = Some(VolumeNotification { volume, is_muted });
    }

    pub fn registered_callbacks(&self) -> usize {
        self.state.lock().callbacks.len()
    }

    /// Simulate a hardware-level change, invoking every registered callback
    /// on the calling thread.
    pub fn fire_notification(&self, volume: f32, is_muted: bool) {
        let callbacks: Vec<VolumeCallback> = {
            let mut state = self.state.lock();
            state.volume = volume;
            state.muted = is_muted;
            state.callbacks.values().cloned().collect()
        };
        for callback in callbacks {
            callback(VolumeNotification { volume, is_muted });
        }
    }
}

impl NativeDevice for FakeDevice {
    fn id(&self) -> Result<String, AudioError> {
        Ok(self.id.clone())
    }

    fn activate_volume(&self) -> Result<Box<dyn VolumeControl>, AudioError> {
        if !self.state.lock().volume_available {
            return Err(AudioError::unavailable("volume control activation failed"));
        }
        Ok(Box::new(FakeVolume {
            state: Arc::clone(&self.state),
        }))
    }

    fn activate_meter(&self) -> Result<Box<dyn MeterInfo>, AudioError> {
        if !self.state.lock().meter_available {
            return Err(AudioError::unavailable("meter activation failed"));
        }
        Ok(Box::new(FakeMeter {
            state: Arc::clone(&self.state),
        }))
    }

    fn open_property_store(
        &self,
        _access: StoreAccess,
    ) -> Result<Box<dyn PropertyStore>, AudioError> {
        let mut state = self.state.lock();
        state.calls.store_opens += 1;
        if !state.store_available {
            return Err(AudioError::PropertyStoreFailed("store unavailable".into()));
        }
        Ok(Box::new(FakePropertyStore {
            friendly_name: state.friendly_name.clone(),
        }))
    }
}

struct FakeVolume {
    state: Arc<Mutex<FakeState>>,
}

impl VolumeControl for FakeVolume {
    fn master_volume_scalar(&self) -> Result<f32, AudioError> {
        let (volume, pending, callbacks) = {
            let mut state = self.state.lock();
            let pending = state.notify_on_read.take();
            let callbacks: Vec<VolumeCallback> = state.callbacks.values().cloned().collect();
            (state.volume, pending, callbacks)
        };
        if let Some(notification) = pending {
            for callback in callbacks {
                callback(notification);
            }
        }
        Ok(volume)
    }

    fn set_master_volume_scalar(&self, level: f32) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        state.calls.set_volume.push(level);
        state.volume = level;
        Ok(())
    }

    fn mute(&self) -> Result<bool, AudioError> {
        Ok(self.state.lock().muted)
    }

    fn set_mute(&self, muted: bool) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        state.calls.set_mute.push(muted);
        state.muted = muted;
        Ok(())
    }

    fn register_notify(&self, callback: VolumeCallback) -> Result<NotifyHandle, AudioError> {
        let mut state = self.state.lock();
        let raw = state.next_handle;
        state.next_handle += 1;
        state.callbacks.insert(raw, callback);
        Ok(NotifyHandle::new(raw))
    }

    fn unregister_notify(&self, handle: NotifyHandle) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        state.callbacks.remove(&handle.raw());
        state.calls.unregistered.push(handle);
        Ok(())
    }
}

struct FakeMeter {
    state: Arc<Mutex<FakeState>>,
}

impl MeterInfo for FakeMeter {
    fn peak_value(&self) -> Result<f32, AudioError> {
        let mut state = self.state.lock();
        state.calls.peak_reads += 1;
        Ok(state.peak)
    }
}

struct FakePropertyStore {
    friendly_name: Option<String>,
}

impl PropertyStore for FakePropertyStore {
    fn get_value(&self, key: &PropertyKey) -> Result<PropertyValue, AudioError> {
        if *key != PropertyKey::DEVICE_FRIENDLY_NAME {
            return Ok(PropertyValue::Empty);
        }
        match &self.friendly_name {
            Some(name) => Ok(PropertyValue::String(name.clone())),
            None => Err(AudioError::PropertyUnavailable {
                key: key.to_string(),
            }),
        }
    }
}

/// Records every session it is told about.
#[derive(Default)]
pub struct RecordingManager {
    created: Mutex<Vec<SessionRef>>,
}

impl RecordingManager {
    pub fn created_ids(&self) -> Vec<String> {
        self.created
            .lock()
            .iter()
            .map(|s| s.id().to_string())
            .collect()
    }
}

impl DeviceManager for RecordingManager {
    fn on_session_created(&self, session: SessionRef) {
        self.created.lock().push(session);
    }
}

/// Runs work immediately on the calling thread.
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn invoke(&self, work: Work) {
        work();
    }
}

#[derive(Debug)]
pub struct FakeSession {
    id: String,
    process_id: u32,
}

impl FakeSession {
    pub fn new(id: &str, process_id: u32) -> SessionRef {
        Arc::new(Self {
            id: id.to_string(),
            process_id,
        })
    }
}

impl AudioDeviceSession for FakeSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        format!("Session {}", self.id)
    }

    fn process_id(&self) -> u32 {
        self.process_id
    }
}
