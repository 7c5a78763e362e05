//! `IMMDevice` as a [`NativeDevice`].

use super::meter::WasapiMeter;
use super::property_store::WasapiPropertyStore;
use super::volume::WasapiVolume;
use crate::audio::{AudioError, MeterInfo, NativeDevice, PropertyStore, StoreAccess, VolumeControl};
use windows::Win32::Media::Audio::IMMDevice;
use windows::Win32::System::Com::{CoTaskMemFree, STGM_READ};

pub struct WasapiDevice {
    device: IMMDevice,
}

// SAFETY: MMDevice API objects are free-threaded (ThreadingModel=Both).
unsafe impl Send for WasapiDevice {}
unsafe impl Sync for WasapiDevice {}

impl WasapiDevice {
    pub fn new(device: IMMDevice) -> Self {
        Self { device }
    }
}

impl NativeDevice for WasapiDevice {
    fn id(&self) -> Result<String, AudioError> {
        unsafe {
            let id = self.device.GetId().map_err(AudioError::WindowsError)?;
            let converted = id
                .to_string()
                .map_err(|e| AudioError::StringConversion(e.to_string()));
            CoTaskMemFree(Some(id.0 as *const _));
            converted
        }
    }

    fn activate_volume(&self) -> Result<Box<dyn VolumeControl>, AudioError> {
        Ok(Box::new(WasapiVolume::new(&self.device)?))
    }

    fn activate_meter(&self) -> Result<Box<dyn MeterInfo>, AudioError> {
        Ok(Box::new(WasapiMeter::new(&self.device)?))
    }

    fn open_property_store(
        &self,
        access: StoreAccess,
    ) -> Result<Box<dyn PropertyStore>, AudioError> {
        let mode = match access {
            StoreAccess::Read => STGM_READ,
        };
        unsafe {
            let store = self
                .device
                .OpenPropertyStore(mode)
                .map_err(|e| AudioError::PropertyStoreFailed(e.to_string()))?;
            Ok(Box::new(WasapiPropertyStore::new(store)))
        }
    }
}
