//! Capture source enumeration
//!
//! Lists shareable screens and windows with thumbnails, and handles the OS
//! permissions capture depends on.

pub mod icon;
pub mod permissions;
pub mod source;
pub mod thumbnail;
pub mod xcap_provider;

#[cfg(target_os = "macos")]
pub mod macos;

pub use source::{
    CaptureError, CaptureResult, CaptureSource, SourceOptions, SourceProvider, SourceType,
    ThumbnailSize,
};
pub use icon::{IconSource, NativeIcons};
pub use xcap_provider::XcapProvider;
