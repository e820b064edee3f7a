//! Capture source definitions
//!
//! Platform-agnostic types for enumerable screens and windows, and the
//! provider trait the bridge delegates to.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Kind of capture target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Window,
    Screen,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Window => "window",
            SourceType::Screen => "screen",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A screen or window that can be shared
///
/// Values are produced fresh by every enumeration and carry no identity
/// across calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSource {
    /// Opaque identifier, e.g. `screen:1:0` or `window:4242:0`
    pub id: String,

    /// Monitor name or window title
    pub name: String,

    /// Window or screen
    #[serde(rename = "type")]
    pub source_type: SourceType,

    /// PNG data URL, empty when no image could be produced
    pub thumbnail: String,

    /// Native monitor id for screens, empty for windows
    pub display_id: String,

    /// Window icon as a data URL, if requested and available
    pub app_icon: Option<String>,
}

impl CaptureSource {
    /// Build the source identifier for a native id
    pub fn make_id(source_type: SourceType, native_id: u32) -> String {
        format!("{}:{}:0", source_type, native_id)
    }
}

/// Requested thumbnail bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

/// What to enumerate and how
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOptions {
    /// Source kinds, in the order they are returned
    pub types: Vec<SourceType>,

    pub thumbnail_size: ThumbnailSize,

    pub fetch_window_icons: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            types: vec![SourceType::Window, SourceType::Screen],
            thumbnail_size: ThumbnailSize {
                width: 400,
                height: 400,
            },
            fetch_window_icons: true,
        }
    }
}

/// Capture enumeration errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to enumerate sources: {0}")]
    Enumeration(String),

    #[error("Failed to render thumbnail: {0}")]
    Thumbnail(String),

    #[error("Enumeration task failed: {0}")]
    Join(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Platform facility that lists capture targets
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Enumerate sources matching `options`, in platform order
    async fn get_sources(&self, options: &SourceOptions) -> CaptureResult<Vec<CaptureSource>>;
}
