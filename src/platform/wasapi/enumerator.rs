//! COM initialization and endpoint lookup using the MMDevice API.

use super::device::WasapiDevice;
use crate::audio::AudioError;
use windows::core::PCWSTR;
use windows::Win32::Media::Audio::{
    eCapture, eConsole, eRender, IMMDeviceEnumerator, MMDeviceEnumerator,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(AudioError::ComInitFailed)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFlow {
    Render,
    Capture,
}

/// Looks up native devices to wrap.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Note: COM must be initialized before calling this function.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(AudioError::EnumerationFailed)?;

            Ok(Self { enumerator })
        }
    }

    /// The default Console-role endpoint for `flow`.
    pub fn default_device(&self, flow: DataFlow) -> Result<WasapiDevice, AudioError> {
        let flow = match flow {
            DataFlow::Render => eRender,
            DataFlow::Capture => eCapture,
        };
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(flow, eConsole)
                .map_err(|_| AudioError::NoDefaultDevice)?;
            Ok(WasapiDevice::new(device))
        }
    }

    /// A specific endpoint by id.
    pub fn device(&self, device_id: &str) -> Result<WasapiDevice, AudioError> {
        let device_id_wide: Vec<u16> =
            device_id.encode_utf16().chain(std::iter::once(0)).collect();

        unsafe {
            let device = self
                .enumerator
                .GetDevice(PCWSTR::from_raw(device_id_wide.as_ptr()))
                .map_err(|e| AudioError::unavailable(format!("{device_id}: {e}")))?;
            Ok(WasapiDevice::new(device))
        }
    }
}
