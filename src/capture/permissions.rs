//! OS-level capture permissions
//!
//! Only macOS gates microphone, camera and screen capture behind a system
//! consent; elsewhere access is decided by the web view policy alone.

use std::fmt;

/// Media device class that needs OS consent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDevice {
    Microphone,
    Camera,
}

impl fmt::Display for MediaDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaDevice::Microphone => f.write_str("microphone"),
            MediaDevice::Camera => f.write_str("camera"),
        }
    }
}

/// Ask the OS for access to a media device
///
/// Returns true if access is already granted. On macOS an undetermined status
/// triggers the system dialog and the answer arrives asynchronously (it is
/// logged), so this returns false in that case.
pub fn request_media_access(device: MediaDevice) -> bool {
    #[cfg(target_os = "macos")]
    {
        super::macos::permissions::request_media_access(device)
    }

    #[cfg(not(target_os = "macos"))]
    {
        let _ = device;
        true
    }
}

/// Check if screen recording permission is granted
pub fn has_screen_recording_permission() -> bool {
    #[cfg(target_os = "macos")]
    {
        super::macos::permissions::has_screen_recording_permission()
    }

    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

/// Request the OS media access the sharing views rely on
pub fn request_startup_access() {
    for device in [MediaDevice::Microphone, MediaDevice::Camera] {
        if request_media_access(device) {
            tracing::debug!("OS {} access granted", device);
        } else {
            tracing::info!("OS {} access not granted yet", device);
        }
    }

    if !has_screen_recording_permission() {
        tracing::warn!("Screen recording permission not granted; thumbnails may be blank");
    }
}
