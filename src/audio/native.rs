//! Native audio subsystem boundary.
//!
//! The endpoint core talks to the platform only through these traits. The
//! Windows implementation lives in `platform::wasapi`; tests use recording
//! stubs.

use super::device::{AudioError, VolumeNotification};
use std::fmt;
use std::sync::Arc;

/// Closure invoked by the native volume control on a thread it owns.
pub type VolumeCallback = Arc<dyn Fn(VolumeNotification) + Send + Sync>;

/// Token returned by [`VolumeControl::register_notify`], used to revoke the
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyHandle(u64);

impl NotifyHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Property store access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAccess {
    Read,
}

/// Key into a device property store (format id + property id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub fmtid: u128,
    pub pid: u32,
}

impl PropertyKey {
    /// PKEY_Device_FriendlyName
    pub const DEVICE_FRIENDLY_NAME: PropertyKey = PropertyKey {
        fmtid: 0xa45c254e_df1c_4efd_8020_67d146a850e0,
        pid: 14,
    };
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:032x}}} {}", self.fmtid, self.pid)
    }
}

/// A property value copied out of the native store.
///
/// Backends release the native variant before handing this back, so the
/// caller owns plain Rust data and has nothing to free.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Empty,
    String(String),
}

impl PropertyValue {
    pub fn into_string(self) -> Option<String> {
        match self {
            PropertyValue::String(s) => Some(s),
            PropertyValue::Empty => None,
        }
    }
}

/// One native audio device (IMMDevice on Windows).
pub trait NativeDevice: Send + Sync {
    /// Stable endpoint id.
    fn id(&self) -> Result<String, AudioError>;

    /// Activate the volume/mute control. Fails with `DeviceUnavailable`.
    fn activate_volume(&self) -> Result<Box<dyn VolumeControl>, AudioError>;

    /// Activate the peak meter. Fails with `DeviceUnavailable`.
    fn activate_meter(&self) -> Result<Box<dyn MeterInfo>, AudioError>;

    fn open_property_store(&self, access: StoreAccess)
        -> Result<Box<dyn PropertyStore>, AudioError>;
}

/// Master volume and mute control for a device.
///
/// Setters are fire-and-forget: no acknowledgement is awaited.
pub trait VolumeControl: Send + Sync {
    fn master_volume_scalar(&self) -> Result<f32, AudioError>;

    fn set_master_volume_scalar(&self, level: f32) -> Result<(), AudioError>;

    fn mute(&self) -> Result<bool, AudioError>;

    fn set_mute(&self, muted: bool) -> Result<(), AudioError>;

    /// Register a callback for volume/mute changes made by anyone, including
    /// other processes.
    fn register_notify(&self, callback: VolumeCallback) -> Result<NotifyHandle, AudioError>;

    /// Revoke a registration. Unknown handles are ignored.
    fn unregister_notify(&self, handle: NotifyHandle) -> Result<(), AudioError>;
}

/// Live peak meter for a device.
pub trait MeterInfo: Send + Sync {
    /// Current peak level (0.0 to 1.0).
    fn peak_value(&self) -> Result<f32, AudioError>;
}

pub trait PropertyStore {
    fn get_value(&self, key: &PropertyKey) -> Result<PropertyValue, AudioError>;
}
