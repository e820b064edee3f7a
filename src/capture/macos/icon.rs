//! Application icons from NSRunningApplication

use objc2::rc::autoreleasepool;
use objc2::runtime::AnyObject;
use objc2::{class, msg_send};
use std::ffi::c_void;

#[link(name = "AppKit", kind = "framework")]
extern "C" {}

/// NSBitmapImageFileTypePNG
const BITMAP_FILE_TYPE_PNG: usize = 4;

/// PNG bytes of the icon of the app running as `pid`
pub fn app_icon_png(pid: u32) -> Option<Vec<u8>> {
    let pid = i32::try_from(pid).ok()?;

    autoreleasepool(|_| unsafe {
        let app: *mut AnyObject =
            msg_send![class!(NSRunningApplication), runningApplicationWithProcessIdentifier: pid];
        if app.is_null() {
            return None;
        }
        let icon: *mut AnyObject = msg_send![app, icon];
        if icon.is_null() {
            return None;
        }
        let tiff: *mut AnyObject = msg_send![icon, TIFFRepresentation];
        if tiff.is_null() {
            return None;
        }
        let rep: *mut AnyObject = msg_send![class!(NSBitmapImageRep), imageRepWithData: tiff];
        if rep.is_null() {
            return None;
        }
        let properties: *mut AnyObject = msg_send![class!(NSDictionary), dictionary];
        let data: *mut AnyObject = msg_send![
            rep,
            representationUsingType: BITMAP_FILE_TYPE_PNG,
            properties: properties
        ];
        if data.is_null() {
            return None;
        }

        let length: usize = msg_send![data, length];
        let bytes: *const c_void = msg_send![data, bytes];
        if bytes.is_null() || length == 0 {
            return None;
        }
        Some(std::slice::from_raw_parts(bytes.cast::<u8>(), length).to_vec())
    })
}
