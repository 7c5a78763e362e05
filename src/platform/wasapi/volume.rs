//! Volume control and change notifications using IAudioEndpointVolume.

use crate::audio::{AudioError, NotifyHandle, VolumeCallback, VolumeControl, VolumeNotification};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use windows::core::implement;
use windows::Win32::Media::Audio::Endpoints::{
    IAudioEndpointVolume, IAudioEndpointVolumeCallback, IAudioEndpointVolumeCallback_Impl,
};
use windows::Win32::Media::Audio::{IMMDevice, AUDIO_VOLUME_NOTIFICATION_DATA};
use windows::Win32::System::Com::CLSCTX_ALL;
// Re-export windows_core so the implement macro can find it
#[allow(unused_imports)]
use windows_core;

/// Volume controller for a specific device.
pub struct WasapiVolume {
    endpoint_volume: IAudioEndpointVolume,
    registrations: Mutex<HashMap<u64, IAudioEndpointVolumeCallback>>,
    next_handle: AtomicU64,
}

// SAFETY: IAudioEndpointVolume is free-threaded, and the callback objects
// we hand out are only touched through it.
unsafe impl Send for WasapiVolume {}
unsafe impl Sync for WasapiVolume {}

impl WasapiVolume {
    pub fn new(device: &IMMDevice) -> Result<Self, AudioError> {
        unsafe {
            let endpoint_volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| AudioError::unavailable(format!("volume activation: {e}")))?;

            Ok(Self {
                endpoint_volume,
                registrations: Mutex::new(HashMap::new()),
                next_handle: AtomicU64::new(1),
            })
        }
    }
}

impl VolumeControl for WasapiVolume {
    fn master_volume_scalar(&self) -> Result<f32, AudioError> {
        unsafe {
            self.endpoint_volume
                .GetMasterVolumeLevelScalar()
                .map_err(AudioError::WindowsError)
        }
    }

    fn set_master_volume_scalar(&self, level: f32) -> Result<(), AudioError> {
        unsafe {
            self.endpoint_volume
                .SetMasterVolumeLevelScalar(level, std::ptr::null())
                .map_err(AudioError::WindowsError)
        }
    }

    fn mute(&self) -> Result<bool, AudioError> {
        unsafe {
            let muted = self
                .endpoint_volume
                .GetMute()
                .map_err(AudioError::WindowsError)?;
            Ok(muted.as_bool())
        }
    }

    fn set_mute(&self, muted: bool) -> Result<(), AudioError> {
        unsafe {
            self.endpoint_volume
                .SetMute(muted, std::ptr::null())
                .map_err(AudioError::WindowsError)
        }
    }

    fn register_notify(&self, callback: VolumeCallback) -> Result<NotifyHandle, AudioError> {
        let client: IAudioEndpointVolumeCallback = VolumeNotificationClient { callback }.into();
        unsafe {
            self.endpoint_volume
                .RegisterControlChangeNotify(&client)
                .map_err(|e| AudioError::NotificationFailed(e.to_string()))?;
        }

        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.registrations.lock().insert(raw, client);
        Ok(NotifyHandle::new(raw))
    }

    fn unregister_notify(&self, handle: NotifyHandle) -> Result<(), AudioError> {
        let Some(client) = self.registrations.lock().remove(&handle.raw()) else {
            return Ok(());
        };
        unsafe {
            self.endpoint_volume
                .UnregisterControlChangeNotify(&client)
                .map_err(AudioError::WindowsError)
        }
    }
}

impl Drop for WasapiVolume {
    fn drop(&mut self) {
        for (_, client) in self.registrations.get_mut().drain() {
            unsafe {
                let _ = self.endpoint_volume.UnregisterControlChangeNotify(&client);
            }
        }
    }
}

/// COM callback forwarding control changes to a closure.
#[implement(IAudioEndpointVolumeCallback)]
struct VolumeNotificationClient {
    callback: VolumeCallback,
}

impl IAudioEndpointVolumeCallback_Impl for VolumeNotificationClient_Impl {
    fn OnNotify(&self, pnotify: *mut AUDIO_VOLUME_NOTIFICATION_DATA) -> windows::core::Result<()> {
        // SAFETY: the pointer is valid for the duration of the call.
        let Some(data) = (unsafe { pnotify.as_ref() }) else {
            return Ok(());
        };

        (self.callback)(VolumeNotification {
            volume: data.fMasterVolume,
            is_muted: data.bMuted.as_bool(),
        });
        Ok(())
    }
}
