//! Capture source enumeration backed by xcap
//!
//! xcap talks to the native window system (CoreGraphics, DXGI/GDI, X11 or
//! Wayland portals). All of it is blocking, so enumeration runs on tokio's
//! blocking pool.

use super::icon::{icon_data_url, IconSource, NativeIcons};
use super::source::{
    CaptureError, CaptureResult, CaptureSource, SourceOptions, SourceProvider, SourceType,
    ThumbnailSize,
};
use super::thumbnail::render_thumbnail;
use async_trait::async_trait;
use std::sync::Arc;
use xcap::{Monitor, Window};

/// Production source provider
pub struct XcapProvider {
    icons: Arc<dyn IconSource>,
}

impl XcapProvider {
    pub fn new() -> Self {
        Self::with_icons(Arc::new(NativeIcons))
    }

    pub fn with_icons(icons: Arc<dyn IconSource>) -> Self {
        Self { icons }
    }
}

impl Default for XcapProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceProvider for XcapProvider {
    async fn get_sources(&self, options: &SourceOptions) -> CaptureResult<Vec<CaptureSource>> {
        let options = options.clone();
        let icons = self.icons.clone();
        tokio::task::spawn_blocking(move || enumerate(&options, icons.as_ref()))
            .await
            .map_err(|e| CaptureError::Join(e.to_string()))?
    }
}

/// Enumerate all requested source types in the requested order
fn enumerate(options: &SourceOptions, icons: &dyn IconSource) -> CaptureResult<Vec<CaptureSource>> {
    let mut sources = Vec::new();
    let icons = options.fetch_window_icons.then_some(icons);

    for source_type in &options.types {
        match source_type {
            SourceType::Window => sources.extend(list_windows(options.thumbnail_size, icons)?),
            SourceType::Screen => sources.extend(list_screens(options.thumbnail_size)?),
        }
    }

    tracing::debug!("Enumerated {} capture sources", sources.len());
    Ok(sources)
}

fn list_screens(bounds: ThumbnailSize) -> CaptureResult<Vec<CaptureSource>> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Enumeration(e.to_string()))?;

    Ok(monitors
        .iter()
        .map(|monitor| {
            let thumbnail = monitor
                .capture_image()
                .map_err(|e| CaptureError::Thumbnail(e.to_string()))
                .and_then(|frame| render_thumbnail(&frame, bounds));

            CaptureSource {
                id: CaptureSource::make_id(SourceType::Screen, monitor.id()),
                name: monitor.name().to_string(),
                source_type: SourceType::Screen,
                thumbnail: thumbnail_or_empty(thumbnail, monitor.id()),
                display_id: monitor.id().to_string(),
                app_icon: None,
            }
        })
        .collect())
}

fn list_windows(
    bounds: ThumbnailSize,
    icons: Option<&dyn IconSource>,
) -> CaptureResult<Vec<CaptureSource>> {
    let windows = Window::all().map_err(|e| CaptureError::Enumeration(e.to_string()))?;

    // Minimised windows have no frame to show, and windows with neither a
    // title nor an owning app name cannot be told apart in the picker
    Ok(windows
        .iter()
        .filter(|window| !window.is_minimized())
        .filter_map(|window| {
            let name = window_name(window.title(), window.app_name())?;

            let thumbnail = window
                .capture_image()
                .map_err(|e| CaptureError::Thumbnail(e.to_string()))
                .and_then(|frame| render_thumbnail(&frame, bounds));

            Some(window_source(
                window.id(),
                window.pid(),
                name,
                thumbnail_or_empty(thumbnail, window.id()),
                icons,
            ))
        })
        .collect())
}

/// Window source, with its app icon when icons are requested
fn window_source(
    native_id: u32,
    pid: u32,
    name: String,
    thumbnail: String,
    icons: Option<&dyn IconSource>,
) -> CaptureSource {
    CaptureSource {
        id: CaptureSource::make_id(SourceType::Window, native_id),
        name,
        source_type: SourceType::Window,
        thumbnail,
        display_id: String::new(),
        app_icon: icons.and_then(|icons| icon_data_url(icons, pid)),
    }
}

/// Title, falling back to the owning application; untitled windows are skipped
fn window_name(title: &str, app_name: &str) -> Option<String> {
    let title = title.trim();
    if !title.is_empty() {
        return Some(title.to_string());
    }

    let app_name = app_name.trim();
    (!app_name.is_empty()).then(|| app_name.to_string())
}

fn thumbnail_or_empty(thumbnail: CaptureResult<String>, native_id: u32) -> String {
    thumbnail.unwrap_or_else(|e| {
        tracing::warn!("No thumbnail for source {}: {}", native_id, e);
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingIcons {
        lookups: AtomicUsize,
    }

    impl IconSource for CountingIcons {
        fn icon(&self, _pid: u32) -> Option<RgbaImage> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Some(RgbaImage::from_pixel(64, 64, image::Rgba([0, 128, 255, 255])))
        }
    }

    #[test]
    fn test_window_source_with_icons() {
        let icons = CountingIcons::default();
        let lookup: &dyn IconSource = &icons;
        let source = window_source(7, 100, "Terminal".to_string(), String::new(), Some(lookup));

        assert_eq!(source.id, "window:7:0");
        assert!(source.app_icon.unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(icons.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_window_source_without_icons() {
        let source = window_source(7, 100, "Terminal".to_string(), String::new(), None);
        assert_eq!(source.app_icon, None);
        assert_eq!(source.display_id, "");
    }

    #[test]
    fn test_window_name_prefers_title() {
        assert_eq!(window_name("README.md - Editor", "Editor"), Some("README.md - Editor".to_string()));
    }

    #[test]
    fn test_window_name_falls_back_to_app() {
        assert_eq!(window_name("  ", "Terminal"), Some("Terminal".to_string()));
        assert_eq!(window_name("", ""), None);
    }

    #[test]
    fn test_failed_thumbnail_is_empty() {
        let failed: CaptureResult<String> = Err(CaptureError::Thumbnail("denied".to_string()));
        assert_eq!(thumbnail_or_empty(failed, 3), "");
        assert_eq!(thumbnail_or_empty(Ok("data:x".to_string()), 3), "data:x");
    }
}
