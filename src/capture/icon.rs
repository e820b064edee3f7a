//! Window icons
//!
//! Looks up the icon of the application that owns a window and renders it as
//! a small PNG data URL for `appIcon`.

use super::source::ThumbnailSize;
use super::thumbnail::render_thumbnail;
use image::RgbaImage;

/// Bounds icons are scaled into
pub const ICON_SIZE: ThumbnailSize = ThumbnailSize {
    width: 32,
    height: 32,
};

/// Resolves the icon of the process owning a window
pub trait IconSource: Send + Sync {
    fn icon(&self, pid: u32) -> Option<RgbaImage>;
}

/// Icons from the OS application registry
#[derive(Debug, Default)]
pub struct NativeIcons;

impl IconSource for NativeIcons {
    #[cfg(target_os = "macos")]
    fn icon(&self, pid: u32) -> Option<RgbaImage> {
        super::macos::icon::app_icon_png(pid).and_then(|bytes| decode_png(&bytes))
    }

    // No per-process icon lookup outside macOS
    #[cfg(not(target_os = "macos"))]
    fn icon(&self, _pid: u32) -> Option<RgbaImage> {
        None
    }
}

/// Icon for `pid` as a data URL, if one resolves and encodes
pub fn icon_data_url(icons: &dyn IconSource, pid: u32) -> Option<String> {
    let icon = icons.icon(pid)?;
    match render_thumbnail(&icon, ICON_SIZE) {
        Ok(url) if !url.is_empty() => Some(url),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Icon for pid {} not encoded: {}", pid, e);
            None
        }
    }
}

/// Decode PNG bytes into RGBA8 pixels
pub fn decode_png(bytes: &[u8]) -> Option<RgbaImage> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().ok()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).ok()?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::Indexed => return None,
    };

    RgbaImage::from_raw(info.width, info.height, rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SolidIcons;

    impl IconSource for SolidIcons {
        fn icon(&self, pid: u32) -> Option<RgbaImage> {
            (pid == 42).then(|| RgbaImage::from_pixel(128, 128, image::Rgba([200, 10, 10, 255])))
        }
    }

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.write_header().unwrap().write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_icon_scaled_to_icon_size() {
        let url = icon_data_url(&SolidIcons, 42).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(icon_data_url(&SolidIcons, 7), None);
    }

    #[test]
    fn test_decode_png_rgb_expands_alpha() {
        let bytes = encode(2, 1, png::ColorType::Rgb, &[1, 2, 3, 4, 5, 6]);
        let image = decode_png(&bytes).unwrap();

        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.as_raw(), &vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_decode_png_rejects_garbage() {
        assert!(decode_png(b"not a png").is_none());
    }
}
