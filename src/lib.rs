//! Audio Endpoint - Library
//!
//! An observable model of one audio endpoint device for a tray-style volume
//! mixer.
//!
//! ## Features
//!
//! - Cached volume, mute and display name, kept current by native push
//!   notifications from any thread
//! - Change notifications marshaled to the UI thread through a dispatcher
//! - Live (uncached) peak level
//! - Per-device session registry, with new sessions forwarded to the device
//!   manager
//! - Deterministic, idempotent teardown
//! - Windows Core Audio backend

pub mod audio;
pub mod dispatcher;
pub mod logging;
pub mod observable;
pub mod platform;

pub use audio::{
    AudioDeviceEndpoint, AudioDeviceSession, AudioError, DeviceManager, EndpointSnapshot,
    PropertyName, SessionChange, SessionRef, SessionRegistry,
};
pub use dispatcher::{ChannelDispatcher, DispatchQueue, Dispatcher};
pub use observable::{Observers, Subscription};
