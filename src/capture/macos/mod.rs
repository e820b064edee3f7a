//! macOS capture support
//!
//! AVFoundation for microphone/camera, CoreGraphics for screen recording,
//! AppKit for application icons.

pub mod icon;
pub mod permissions;
