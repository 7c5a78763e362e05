//! Audio endpoint data models.
//!
//! Defines the error type shared by the endpoint core and the native
//! backends, the volume notification payload, the names of the observable
//! endpoint properties, and a plain snapshot of endpoint state.

use std::fmt;
use thiserror::Error;

/// Payload delivered by the native volume-control callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeNotification {
    /// Master volume as scalar (0.0 to 1.0)
    pub volume: f32,

    /// Mute state after the change
    pub is_muted: bool,
}

/// Observable endpoint properties that raise change notifications.
///
/// `peak_value` is intentionally absent: it is poll-based and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    DisplayName,
    Volume,
    IsMuted,
}

impl PropertyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyName::DisplayName => "display_name",
            PropertyName::Volume => "volume",
            PropertyName::IsMuted => "is_muted",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of an endpoint's cached state.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSnapshot {
    /// Stable device ID (opaque string from IMMDevice::GetId)
    pub id: String,

    /// Human-readable device name; may change while `id` stays fixed
    pub display_name: String,

    /// Volume level as scalar (0.0 to 1.0)
    pub volume: f32,

    /// Current mute state
    pub is_muted: bool,
}

impl EndpointSnapshot {
    /// Volume as percentage (0-100).
    pub fn volume_percent(&self) -> u8 {
        (self.volume * 100.0).round() as u8
    }
}

/// Convert a linear peak (0.0 to 1.0) to dBFS, clamped to -60dB..0dB.
pub fn peak_to_dbfs(peak: f32) -> f64 {
    if peak <= 0.0 {
        -60.0
    } else {
        (20.0 * (peak as f64).log10()).clamp(-60.0, 0.0)
    }
}

/// Audio endpoint error types.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    #[error("No default device available")]
    NoDefaultDevice,

    #[error("Failed to open property store: {0}")]
    PropertyStoreFailed(String),

    #[error("Property not available: {key}")]
    PropertyUnavailable { key: String },

    #[error("Failed to register volume notifications: {0}")]
    NotificationFailed(String),

    #[error("String conversion error: {0}")]
    StringConversion(String),

    #[cfg(target_os = "windows")]
    #[error("COM initialization failed: {0}")]
    ComInitFailed(#[source] windows::core::Error),

    #[cfg(target_os = "windows")]
    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(#[source] windows::core::Error),

    #[cfg(target_os = "windows")]
    #[error("Windows API error: {0}")]
    WindowsError(#[source] windows::core::Error),
}

impl AudioError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        AudioError::DeviceUnavailable {
            reason: reason.into(),
        }
    }

    /// True for the construction-time fault raised when the device went away.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(self, AudioError::DeviceUnavailable { .. })
    }
}
