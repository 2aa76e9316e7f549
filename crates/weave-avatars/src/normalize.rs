//! Avatar image normalization
//!
//! Downloaded avatars come in whatever format the host serves. The visualizer
//! is picky about some of them, so every avatar is decoded and re-encoded as
//! an 8-bit RGBA PNG. Re-normalizing a normalized image gives the same bytes.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::AvatarError;

/// Decode any supported image and re-encode it as RGBA PNG
pub fn normalize_image(bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AvatarError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();

    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn sample(format: ImageFormat) -> Vec<u8> {
        let img = ImageBuffer::from_fn(16, 12, |x, y| Rgb([(x * 16) as u8, (y * 20) as u8, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_output_is_rgba_png() {
        let normalized = normalize_image(&sample(ImageFormat::Jpeg)).unwrap();
        assert_eq!(image::guess_format(&normalized).unwrap(), ImageFormat::Png);

        let decoded = image::load_from_memory(&normalized).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgba8);
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
    }

    #[test]
    fn test_normalization_is_stable() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg] {
            let first = normalize_image(&sample(format)).unwrap();
            let second = normalize_image(&first).unwrap();
            assert_eq!(first, second, "{format:?}");
        }
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = normalize_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AvatarError::Decode(_)));
    }
}
