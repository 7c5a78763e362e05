//! Level metering using IAudioMeterInformation.

use crate::audio::{AudioError, MeterInfo};
use windows::Win32::Media::Audio::{Endpoints::IAudioMeterInformation, IMMDevice};
use windows::Win32::System::Com::CLSCTX_ALL;

/// Peak meter for a specific device.
pub struct WasapiMeter {
    meter_info: IAudioMeterInformation,
}

// SAFETY: endpoint meter objects are free-threaded.
unsafe impl Send for WasapiMeter {}
unsafe impl Sync for WasapiMeter {}

impl WasapiMeter {
    pub fn new(device: &IMMDevice) -> Result<Self, AudioError> {
        unsafe {
            let meter_info: IAudioMeterInformation = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| AudioError::unavailable(format!("meter activation: {e}")))?;

            Ok(Self { meter_info })
        }
    }
}

impl MeterInfo for WasapiMeter {
    fn peak_value(&self) -> Result<f32, AudioError> {
        unsafe {
            self.meter_info
                .GetPeakValue()
                .map_err(AudioError::WindowsError)
        }
    }
}
