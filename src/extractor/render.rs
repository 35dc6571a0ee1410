use crate::error::{ExportError, Result};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// When and how far an image is scaled to reach the target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizePolicy {
    pub target_width: u32,
    pub allow_upscale: bool,
}

impl ResizePolicy {
    pub fn new(target_width: u32, allow_upscale: bool) -> Self {
        Self {
            target_width,
            allow_upscale,
        }
    }

    /// Output size for an image of `width` x `height`, or `None` to keep it.
    ///
    /// Height follows the aspect ratio, rounded half to even.
    pub fn target_size(&self, width: u32, height: u32) -> Result<Option<(u32, u32)>> {
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidImageSize { width, height });
        }

        let needs_resize =
            width != self.target_width && (self.allow_upscale || width > self.target_width);
        if !needs_resize {
            return Ok(None);
        }

        let scaled = f64::from(height) * f64::from(self.target_width) / f64::from(width);
        let new_height = scaled.round_ties_even();
        if new_height < 1.0 || new_height > f64::from(u32::MAX) {
            return Err(ExportError::InvalidImageSize {
                width: self.target_width,
                height: new_height as u32,
            });
        }

        Ok(Some((self.target_width, new_height as u32)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
}

impl RenderedImage {
    pub fn was_resized(&self) -> bool {
        self.width != self.original_width || self.height != self.original_height
    }
}

/// Decode `blob`, convert it to RGBA and apply `policy`.
pub fn render_rgba(blob: &[u8], policy: &ResizePolicy) -> Result<(RgbaImage, RenderedImage)> {
    let decoded = image::load_from_memory(blob)?;
    let rgba = decoded.into_rgba8();
    let (original_width, original_height) = rgba.dimensions();

    let output = match policy.target_size(original_width, original_height)? {
        Some((width, height)) => imageops::resize(&rgba, width, height, FilterType::Lanczos3),
        None => rgba,
    };

    let (width, height) = output.dimensions();
    Ok((
        output,
        RenderedImage {
            original_width,
            original_height,
            width,
            height,
        },
    ))
}

/// Render `blob` and write it as an RGBA PNG to `out_path`, replacing any existing file.
pub fn save_blob_as_png(blob: &[u8], out_path: &Path, policy: &ResizePolicy) -> Result<RenderedImage> {
    let (image, rendered) = render_rgba(blob, policy)?;

    let mut writer = BufWriter::new(File::create(out_path)?);
    image.write_to(&mut writer, ImageFormat::Png)?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::fixture::encode;
    use image::{DynamicImage, GenericImageView, GrayImage, Luma};
    use tempfile::TempDir;

    #[test]
    fn test_no_upscale_keeps_narrow_images() {
        let policy = ResizePolicy::new(500, false);
        assert_eq!(policy.target_size(300, 200).unwrap(), None);
        assert_eq!(policy.target_size(500, 200).unwrap(), None);
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let policy = ResizePolicy::new(500, false);
        assert_eq!(policy.target_size(1000, 800).unwrap(), Some((500, 400)));
    }

    #[test]
    fn test_forced_upscale() {
        let policy = ResizePolicy::new(500, true);
        assert_eq!(policy.target_size(200, 100).unwrap(), Some((500, 250)));
        assert_eq!(policy.target_size(500, 100).unwrap(), None);
    }

    #[test]
    fn test_height_rounds_half_to_even() {
        // 5 * 100 / 200 = 2.5 and 7 * 100 / 200 = 3.5
        let policy = ResizePolicy::new(100, false);
        assert_eq!(policy.target_size(200, 5).unwrap(), Some((100, 2)));
        assert_eq!(policy.target_size(200, 7).unwrap(), Some((100, 4)));
        assert_eq!(policy.target_size(300, 100).unwrap(), Some((100, 33)));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let policy = ResizePolicy::new(500, true);
        assert!(matches!(
            policy.target_size(0, 10),
            Err(ExportError::InvalidImageSize { width: 0, height: 10 })
        ));
        assert!(policy.target_size(10, 0).is_err());
    }

    #[test]
    fn test_height_collapsing_to_zero_is_rejected() {
        let policy = ResizePolicy::new(10, false);
        assert!(matches!(
            policy.target_size(10_000, 1),
            Err(ExportError::InvalidImageSize { .. })
        ));
    }

    #[test]
    fn test_jpeg_source_becomes_rgba_png() {
        let temp_dir = TempDir::new().unwrap();
        let out_path = temp_dir.path().join("1.png");
        let jpeg = encode(&DynamicImage::new_rgb8(1000, 800), ImageFormat::Jpeg);

        let rendered = save_blob_as_png(&jpeg, &out_path, &ResizePolicy::new(500, false)).unwrap();
        assert_eq!((rendered.width, rendered.height), (500, 400));
        assert!(rendered.was_resized());

        let bytes = std::fs::read(&out_path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        let written = image::load_from_memory(&bytes).unwrap();
        assert_eq!(written.dimensions(), (500, 400));
        assert!(written.color().has_alpha());
    }

    #[test]
    fn test_grayscale_source_gains_alpha() {
        let temp_dir = TempDir::new().unwrap();
        let out_path = temp_dir.path().join("1.png");
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(30, 20, Luma([128])));
        let png = encode(&gray, ImageFormat::Png);

        let rendered = save_blob_as_png(&png, &out_path, &ResizePolicy::new(500, false)).unwrap();
        assert!(!rendered.was_resized());

        let written = image::open(&out_path).unwrap();
        assert_eq!(written.dimensions(), (30, 20));
        assert_eq!(written.color(), image::ColorType::Rgba8);
        assert_eq!(written.to_rgba8().get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_corrupt_blob_is_an_image_error() {
        let temp_dir = TempDir::new().unwrap();
        let out_path = temp_dir.path().join("1.png");

        let result = save_blob_as_png(b"\x89PNG\r\n\x1a\nbroken", &out_path, &ResizePolicy::new(500, false));
        assert!(matches!(result, Err(ExportError::Image { .. }) | Err(ExportError::Io(_))));
    }

    #[test]
    fn test_unknown_format_is_an_image_error() {
        let policy = ResizePolicy::new(500, false);
        let result = render_rgba(b"definitely not an image", &policy);
        assert!(matches!(result, Err(ExportError::Image { .. })));
    }
}
