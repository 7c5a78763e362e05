//! Audio module: the endpoint model and the native boundary it sits on.
//!
//! This module is platform-agnostic. The Windows Core Audio implementation
//! of the native traits lives in `platform::wasapi`.

pub mod device;
pub mod endpoint;
pub mod manager;
pub mod native;
pub mod sessions;

#[cfg(test)]
pub(crate) mod testing;

pub use device::{AudioError, EndpointSnapshot, PropertyName, VolumeNotification};
pub use endpoint::AudioDeviceEndpoint;
pub use manager::DeviceManager;
pub use native::{
    MeterInfo, NativeDevice, NotifyHandle, PropertyKey, PropertyStore, PropertyValue,
    StoreAccess, VolumeCallback, VolumeControl,
};
pub use sessions::{AudioDeviceSession, SessionChange, SessionRef, SessionRegistry};
