//! Application window construction

use super::permissions;
use crate::config::{Rgba, WindowSpec};
use crate::utils::{AppError, AppResult};
use tauri::utils::config::{BackgroundThrottlingPolicy, Color};
use tauri::{AppHandle, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

/// Build the main window and install the permission policy on its web view
pub fn create_main_window(app: &AppHandle, spec: &WindowSpec) -> AppResult<WebviewWindow> {
    let throttling = if spec.background_throttling {
        BackgroundThrottlingPolicy::Suspend
    } else {
        BackgroundThrottlingPolicy::Disabled
    };
    let Rgba(r, g, b, a) = Rgba::from_hex(&spec.background).ok_or_else(|| {
        AppError::Window(format!("invalid background color '{}'", spec.background))
    })?;
    let background = Color(r, g, b, a);

    let window = WebviewWindowBuilder::new(
        app,
        spec.label.as_str(),
        WebviewUrl::App(spec.initial_view.clone().into()),
    )
    .title(&spec.title)
    .inner_size(spec.width, spec.height)
    .min_inner_size(spec.min_width, spec.min_height)
    .background_color(background)
    .background_throttling(throttling)
    .build()?;

    if let Err(e) = permissions::install(&window) {
        tracing::warn!("Permission policy not installed on {}: {}", spec.label, e);
    }

    tracing::info!(
        "Created window '{}' ({}x{}) with {}",
        spec.label,
        spec.width,
        spec.height,
        spec.initial_view
    );

    Ok(window)
}
