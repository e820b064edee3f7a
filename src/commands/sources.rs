//! Capture source commands
//!
//! `get_sources` is the `GET_SOURCES` request of the sharing views.

use crate::bridge::SourceBridge;
use crate::capture::{CaptureSource, SourceOptions, XcapProvider};
use std::sync::Arc;
use tauri::State;

/// Managed state holding the bridge
pub struct BridgeState {
    pub bridge: SourceBridge,
}

impl BridgeState {
    pub fn new(options: SourceOptions) -> Self {
        Self {
            bridge: SourceBridge::new(Arc::new(XcapProvider::new()), options),
        }
    }
}

/// List shareable windows and screens
///
/// Never fails: enumeration errors are logged and yield an empty list.
#[tauri::command]
pub async fn get_sources(state: State<'_, BridgeState>) -> Result<Vec<CaptureSource>, String> {
    let listing = state.bridge.get_sources().await;
    Ok(listing.sources)
}
