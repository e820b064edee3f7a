//! Host configuration
//!
//! Everything here is fixed at build time; `HostConfig::default()` is the
//! configuration the app runs with.

use crate::capture::SourceOptions;

/// Label of the single application window
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "screenshare_host=debug,tauri=info";

/// RGBA window background color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        // from_str_radix alone would accept a leading '+'
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();

        match digits.len() {
            6 => Some(Rgba(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

/// Fixed geometry and content of the application window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Background color as `#rrggbb` or `#rrggbbaa`
    pub background: String,
    /// View document loaded at startup, relative to the frontend dir
    pub initial_view: String,
    /// Keep rendering while minimised so shared video does not stall
    pub background_throttling: bool,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            label: MAIN_WINDOW_LABEL.to_string(),
            title: "Screenshare".to_string(),
            width: 1280.0,
            height: 800.0,
            min_width: 800.0,
            min_height: 600.0,
            background: "#111827".to_string(),
            initial_view: "login.html".to_string(),
            background_throttling: false,
        }
    }
}

/// Top-level host configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostConfig {
    pub window: WindowSpec,
    pub sources: SourceOptions,
}
