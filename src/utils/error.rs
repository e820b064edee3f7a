//! Error types and handling
//!
//! Common error types used across the host.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Window error: {0}")]
    Window(String),

    #[error("Permission error: {0}")]
    Permission(String),
}

impl From<tauri::Error> for AppError {
    fn from(error: tauri::Error) -> Self {
        AppError::Window(error.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
