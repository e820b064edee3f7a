//! Tauri command handlers
//!
//! IPC commands the views call through `invoke`.

pub mod sources;
