//! macOS permission handling
//!
//! Microphone/camera consent through AVFoundation and screen recording
//! consent through CoreGraphics.

use crate::capture::permissions::MediaDevice;
use block2::RcBlock;
use core_graphics::access::ScreenCaptureAccess;
use objc2::runtime::Bool;
use objc2::{class, msg_send};
use objc2_foundation::NSString;

#[link(name = "AVFoundation", kind = "framework")]
extern "C" {}

/// AVAuthorizationStatusAuthorized
const AUTHORIZATION_STATUS_AUTHORIZED: isize = 3;

/// AVMediaType constant values
fn media_type(device: MediaDevice) -> &'static str {
    match device {
        MediaDevice::Microphone => "soun",
        MediaDevice::Camera => "vide",
    }
}

/// Current AVAuthorizationStatus for a device class
pub fn media_authorization_status(device: MediaDevice) -> isize {
    let media_type = NSString::from_str(media_type(device));
    unsafe { msg_send![class!(AVCaptureDevice), authorizationStatusForMediaType: &*media_type] }
}

/// Request microphone or camera access
///
/// Returns true if access was already granted. Otherwise the system prompt is
/// shown (at most once per app) and the answer is logged when it arrives.
pub fn request_media_access(device: MediaDevice) -> bool {
    if media_authorization_status(device) == AUTHORIZATION_STATUS_AUTHORIZED {
        return true;
    }

    let media_type = NSString::from_str(media_type(device));
    let handler = RcBlock::new(move |granted: Bool| {
        if granted.as_bool() {
            tracing::info!("{} access granted", device);
        } else {
            tracing::warn!("{} access denied", device);
        }
    });

    unsafe {
        let _: () = msg_send![
            class!(AVCaptureDevice),
            requestAccessForMediaType: &*media_type,
            completionHandler: &*handler
        ];
    }

    false
}

/// Check if screen recording permission is granted
pub fn has_screen_recording_permission() -> bool {
    ScreenCaptureAccess::preflight()
}
