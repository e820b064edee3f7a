//! Window host
//!
//! Creates the application window, applies the web view permission policy
//! and drives the process lifecycle.

pub mod lifecycle;
pub mod permissions;
pub mod window;

pub use lifecycle::{LifecycleAction, LifecycleController, Platform};
pub use permissions::{is_permission_allowed, PermissionKind};
pub use window::create_main_window;
