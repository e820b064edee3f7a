//! Thumbnail rendering
//!
//! Scales captured frames to fit the requested bounds and encodes them as
//! PNG data URLs that views can drop straight into an `<img>`.

use super::source::{CaptureError, CaptureResult, ThumbnailSize};
use base64::Engine;
use image::RgbaImage;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Largest size with the source aspect ratio that fits inside the bounds.
///
/// Never upscales and never exceeds the bounds. An empty source or empty
/// bounds give `(0, 0)`; otherwise neither dimension is zero.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return (0, 0);
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let scaled_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let scaled_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);

    (scaled_width, scaled_height)
}

/// Scale a frame to the thumbnail bounds and encode it as a data URL
pub fn render_thumbnail(frame: &RgbaImage, bounds: ThumbnailSize) -> CaptureResult<String> {
    let (width, height) = fit_within(frame.width(), frame.height(), bounds.width, bounds.height);
    if width == 0 || height == 0 {
        return Ok(String::new());
    }
    let scaled = if (width, height) == frame.dimensions() {
        frame.clone()
    } else {
        image::imageops::thumbnail(frame, width, height)
    };

    encode_png_data_url(scaled.as_raw(), width, height)
}

/// Encode RGBA8 pixels as a `data:image/png;base64,` URL
pub fn encode_png_data_url(rgba: &[u8], width: u32, height: u32) -> CaptureResult<String> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| CaptureError::Thumbnail(format!("PNG header error: {}", e)))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| CaptureError::Thumbnail(format!("PNG encode error: {}", e)))?;
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("{}{}", DATA_URL_PREFIX, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within_landscape() {
        assert_eq!(fit_within(1920, 1080, 400, 400), (400, 225));
    }

    #[test]
    fn test_fit_within_portrait() {
        assert_eq!(fit_within(1080, 1920, 400, 400), (225, 400));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(120, 80, 400, 400), (120, 80));
    }

    #[test]
    fn test_fit_within_never_zero() {
        assert_eq!(fit_within(10000, 1, 400, 400), (400, 1));
    }

    #[test]
    fn test_fit_within_empty_input_or_bounds() {
        assert_eq!(fit_within(0, 0, 400, 400), (0, 0));
        assert_eq!(fit_within(1920, 1080, 0, 0), (0, 0));
        assert_eq!(fit_within(1920, 1080, 400, 0), (0, 0));
    }

    #[test]
    fn test_render_thumbnail_scales_and_encodes() {
        let frame = RgbaImage::from_pixel(800, 400, image::Rgba([17, 24, 39, 255]));
        let url = render_thumbnail(&frame, ThumbnailSize { width: 400, height: 400 }).unwrap();

        assert!(url.starts_with(DATA_URL_PREFIX));

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&url[DATA_URL_PREFIX.len()..])
            .unwrap();
        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 400);
        assert_eq!(reader.info().height, 200);
    }

    #[test]
    fn test_render_thumbnail_empty_frame() {
        let frame = RgbaImage::new(0, 0);
        let url = render_thumbnail(&frame, ThumbnailSize { width: 400, height: 400 }).unwrap();
        assert!(url.is_empty());
    }

    #[test]
    fn test_render_thumbnail_zero_bounds() {
        let frame = RgbaImage::from_pixel(64, 64, image::Rgba([0, 0, 0, 255]));
        let url = render_thumbnail(&frame, ThumbnailSize { width: 0, height: 0 }).unwrap();
        assert!(url.is_empty());
    }
}
