//! Web view permission policy
//!
//! Media and display-capture requests from our own views are granted without
//! a prompt; every other permission is denied.

use crate::utils::AppResult;
use std::fmt;
use tauri::WebviewWindow;

/// Permission a view asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionKind {
    Media,
    DisplayCapture,
    AudioCapture,
    MediaKeySystem,
    Other(String),
}

impl PermissionKind {
    pub fn as_str(&self) -> &str {
        match self {
            PermissionKind::Media => "media",
            PermissionKind::DisplayCapture => "display-capture",
            PermissionKind::AudioCapture => "audio-capture",
            PermissionKind::MediaKeySystem => "media-key-system",
            PermissionKind::Other(name) => name,
        }
    }
}

impl From<&str> for PermissionKind {
    fn from(name: &str) -> Self {
        match name {
            "media" => PermissionKind::Media,
            "display-capture" => PermissionKind::DisplayCapture,
            "audio-capture" => PermissionKind::AudioCapture,
            "media-key-system" | "mediaKeySystem" => PermissionKind::MediaKeySystem,
            other => PermissionKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a permission is granted
pub fn is_permission_allowed(kind: &PermissionKind) -> bool {
    matches!(
        kind,
        PermissionKind::Media
            | PermissionKind::DisplayCapture
            | PermissionKind::AudioCapture
            | PermissionKind::MediaKeySystem
    )
}

/// Apply the policy to one request, logging the decision
fn decide(kind: &PermissionKind) -> bool {
    let allowed = is_permission_allowed(kind);
    if allowed {
        tracing::debug!("Granted web view permission: {}", kind);
    } else {
        tracing::warn!("Denied web view permission: {}", kind);
    }
    allowed
}

/// Install the policy on a window's web view
pub fn install(window: &WebviewWindow) -> AppResult<()> {
    platform::install(window)
}

#[cfg(target_os = "linux")]
mod platform {
    use super::{decide, PermissionKind};
    use crate::utils::{AppError, AppResult};
    use glib::prelude::*;
    use tauri::WebviewWindow;
    use webkit2gtk::{PermissionRequest, PermissionRequestExt, WebViewExt};

    pub fn install(window: &WebviewWindow) -> AppResult<()> {
        window.with_webview(|webview| {
            webview.inner().connect_permission_request(|_, request| {
                if decide(&classify(request)) {
                    request.allow();
                } else {
                    request.deny();
                }
                true
            });
        })
        .map_err(|e| AppError::Permission(format!("web view unavailable: {}", e)))?;
        tracing::debug!("Permission policy installed on {}", window.label());
        Ok(())
    }

    fn classify(request: &PermissionRequest) -> PermissionKind {
        match request.type_().name() {
            "WebKitUserMediaPermissionRequest" => {
                let audio = request.property::<bool>("is-for-audio-device");
                let video = request.property::<bool>("is-for-video-device");
                if audio && !video {
                    PermissionKind::AudioCapture
                } else {
                    PermissionKind::Media
                }
            }
            "WebKitDeviceInfoPermissionRequest" => PermissionKind::Media,
            "WebKitMediaKeySystemPermissionRequest" => PermissionKind::MediaKeySystem,
            other => PermissionKind::Other(other.to_string()),
        }
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use super::{decide, PermissionKind};
    use crate::utils::{AppError, AppResult};
    use tauri::WebviewWindow;
    use webview2_com::Microsoft::Web::WebView2::Win32::{
        ICoreWebView2, ICoreWebView2Controller, ICoreWebView2PermissionRequestedEventArgs,
        COREWEBVIEW2_PERMISSION_KIND, COREWEBVIEW2_PERMISSION_KIND_CAMERA,
        COREWEBVIEW2_PERMISSION_KIND_MICROPHONE, COREWEBVIEW2_PERMISSION_STATE_ALLOW,
        COREWEBVIEW2_PERMISSION_STATE_DENY,
    };
    use webview2_com::PermissionRequestedEventHandler;

    pub fn install(window: &WebviewWindow) -> AppResult<()> {
        window.with_webview(|webview| {
            if let Err(e) = register(&webview.controller()) {
                tracing::warn!("Failed to install permission handler: {}", e);
            }
        })
        .map_err(|e| AppError::Permission(format!("web view unavailable: {}", e)))?;
        tracing::debug!("Permission policy installed on {}", window.label());
        Ok(())
    }

    fn register(controller: &ICoreWebView2Controller) -> windows::core::Result<()> {
        unsafe {
            let core = controller.CoreWebView2()?;
            let handler = PermissionRequestedEventHandler::create(Box::new(
                |_: Option<ICoreWebView2>, args: Option<ICoreWebView2PermissionRequestedEventArgs>| {
                    if let Some(args) = args {
                        let mut kind = COREWEBVIEW2_PERMISSION_KIND::default();
                        args.PermissionKind(&mut kind)?;
                        let state = if decide(&classify(kind)) {
                            COREWEBVIEW2_PERMISSION_STATE_ALLOW
                        } else {
                            COREWEBVIEW2_PERMISSION_STATE_DENY
                        };
                        args.SetState(state)?;
                    }
                    Ok(())
                },
            ));
            let mut token = Default::default();
            core.add_PermissionRequested(&handler, &mut token)?;
        }
        Ok(())
    }

    fn classify(kind: COREWEBVIEW2_PERMISSION_KIND) -> PermissionKind {
        match kind {
            COREWEBVIEW2_PERMISSION_KIND_MICROPHONE => PermissionKind::AudioCapture,
            COREWEBVIEW2_PERMISSION_KIND_CAMERA => PermissionKind::Media,
            other => PermissionKind::Other(format!("webview2-kind-{}", other.0)),
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod platform {
    use crate::utils::AppResult;
    use tauri::WebviewWindow;

    pub fn install(window: &WebviewWindow) -> AppResult<()> {
        // WKWebView grants capture to the app's own content without prompting
        tracing::debug!("Using native media capture policy for {}", window.label());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_kinds() {
        for name in ["media", "display-capture", "audio-capture", "media-key-system"] {
            assert!(is_permission_allowed(&PermissionKind::from(name)), "{} should be allowed", name);
        }
    }

    #[test]
    fn test_other_kinds_denied() {
        for name in [
            "geolocation",
            "notifications",
            "clipboard-read",
            "pointerLock",
            "openExternal",
            "midi",
            "",
            "Media",
        ] {
            assert!(!is_permission_allowed(&PermissionKind::from(name)), "{} should be denied", name);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(PermissionKind::from("mediaKeySystem"), PermissionKind::MediaKeySystem);
        assert_eq!(PermissionKind::from("display-capture"), PermissionKind::DisplayCapture);
        assert_eq!(
            PermissionKind::from("geolocation"),
            PermissionKind::Other("geolocation".to_string())
        );
        assert_eq!(PermissionKind::MediaKeySystem.to_string(), "media-key-system");
        assert_eq!(PermissionKind::from("midi").to_string(), "midi");
    }

    #[test]
    fn test_decide_matches_policy() {
        assert!(decide(&PermissionKind::AudioCapture));
        assert!(!decide(&PermissionKind::Other("geolocation".to_string())));
    }
}
