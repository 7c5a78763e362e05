//! Windows Core Audio implementation of the native boundary.
//!
//! - `WasapiDevice` wraps `IMMDevice`
//! - `WasapiVolume` wraps `IAudioEndpointVolume` and its change callback
//! - `WasapiMeter` wraps `IAudioMeterInformation`
//! - `WasapiPropertyStore` wraps `IPropertyStore`
//!
//! COM must be initialized on the calling thread (see [`ComGuard`]).

pub mod device;
pub mod enumerator;
pub mod meter;
pub mod property_store;
pub mod volume;

pub use device::WasapiDevice;
pub use enumerator::{ComGuard, DataFlow, DeviceEnumerator};
pub use meter::WasapiMeter;
pub use property_store::WasapiPropertyStore;
pub use volume::WasapiVolume;
