//! Screenshare Host - desktop shell for screen sharing.
//!
//! Opens the application window, grants media and display-capture permissions
//! to its views, and answers their capture source requests.

pub mod bridge;
pub mod capture;
pub mod commands;
pub mod config;
pub mod host;
pub mod signaling;
pub mod utils;

use commands::sources::BridgeState;
use config::HostConfig;
use host::{LifecycleAction, LifecycleController, Platform};
use parking_lot::Mutex;
use tauri::{AppHandle, Manager, RunEvent, WindowEvent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Managed lifecycle state
pub struct HostState {
    pub lifecycle: Mutex<LifecycleController>,
}

/// Initialize and run the application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Screenshare Host v{}", env!("CARGO_PKG_VERSION"));

    let config = HostConfig::default();

    let app = tauri::Builder::default()
        .manage(BridgeState::new(config.sources.clone()))
        .manage(HostState {
            lifecycle: Mutex::new(LifecycleController::new(Platform::current(), config.window)),
        })
        .invoke_handler(tauri::generate_handler![commands::sources::get_sources])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(handle_run_event);
}

fn handle_run_event(app: &AppHandle, event: RunEvent) {
    let state = app.state::<HostState>();

    match event {
        RunEvent::Ready => {
            capture::permissions::request_startup_access();
            let action = state.lifecycle.lock().on_ready();
            apply(app, action);
        }
        RunEvent::WindowEvent {
            label,
            event: WindowEvent::Destroyed,
            ..
        } => {
            let mut lifecycle = state.lifecycle.lock();
            let action = lifecycle.window_closed(&label);
            tracing::info!("Window '{}' closed, {} still open", label, lifecycle.window_count());
            drop(lifecycle);
            apply(app, action);
        }
        RunEvent::ExitRequested { code: None, api, .. } => {
            if state.lifecycle.lock().should_stay_resident() {
                tracing::debug!("Last window closed, staying resident");
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            let action = state.lifecycle.lock().on_activate();
            apply(app, action);
        }
        _ => {}
    }
}

/// Carry out a lifecycle decision against the runtime
fn apply(app: &AppHandle, action: LifecycleAction) {
    match action {
        LifecycleAction::None => {}
        LifecycleAction::CreateWindow(spec) => match host::create_main_window(app, &spec) {
            Ok(window) => app
                .state::<HostState>()
                .lifecycle
                .lock()
                .window_opened(window.label()),
            Err(e) => tracing::error!("Failed to create window '{}': {}", spec.label, e),
        },
        LifecycleAction::Exit => {
            tracing::info!("All windows closed, exiting");
            app.exit(0);
        }
    }
}
