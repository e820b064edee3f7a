//! Process lifecycle
//!
//! Tracks open windows and decides what to do on ready, window-closed and
//! activate events. The controller does no I/O; `lib.rs` carries out the
//! returned actions against the Tauri runtime.

use crate::config::WindowSpec;

/// How the platform treats apps with no windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Apps stay running with no windows and are reopened from the dock (macOS)
    Resident,
    /// Closing the last window ends the app
    Standard,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Resident
        } else {
            Platform::Standard
        }
    }
}

/// What the runtime should do after an event
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleAction {
    None,
    CreateWindow(WindowSpec),
    Exit,
}

/// Owns the registry of open windows
///
/// A window is registered once the runtime has built it and unregistered when
/// it is destroyed. At most one window is requested per ready/activate event.
#[derive(Debug)]
pub struct LifecycleController {
    platform: Platform,
    spec: WindowSpec,
    windows: Vec<String>,
    ready: bool,
}

impl LifecycleController {
    pub fn new(platform: Platform, spec: WindowSpec) -> Self {
        Self {
            platform,
            spec,
            windows: Vec::new(),
            ready: false,
        }
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Application ready; only the first call creates a window
    pub fn on_ready(&mut self) -> LifecycleAction {
        if self.ready {
            return LifecycleAction::None;
        }
        self.ready = true;
        LifecycleAction::CreateWindow(self.spec.clone())
    }

    /// Register a window the runtime has created
    pub fn window_opened(&mut self, label: &str) {
        if !self.windows.iter().any(|w| w == label) {
            self.windows.push(label.to_string());
        }
    }

    /// Unregister a destroyed window
    pub fn window_closed(&mut self, label: &str) -> LifecycleAction {
        let before = self.windows.len();
        self.windows.retain(|w| w != label);

        if before == self.windows.len() || !self.windows.is_empty() {
            return LifecycleAction::None;
        }

        match self.platform {
            Platform::Standard => LifecycleAction::Exit,
            Platform::Resident => LifecycleAction::None,
        }
    }

    /// App reactivated (dock click); recreate the window if none is open
    pub fn on_activate(&mut self) -> LifecycleAction {
        if self.ready && self.windows.is_empty() {
            LifecycleAction::CreateWindow(self.spec.clone())
        } else {
            LifecycleAction::None
        }
    }

    /// Whether an exit request should be refused: only on resident
    /// platforms, and only once no window is left
    pub fn should_stay_resident(&self) -> bool {
        self.platform == Platform::Resident && self.windows.is_empty()
    }
}
