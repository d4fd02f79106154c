//! Image loader/saver collaborators.
//!
//! The engine itself never touches the filesystem; these helpers sit at
//! the edges. The loader hands back whatever layout the decoder produced
//! and leaves normalization to the engine. The saver picks the codec from
//! the file extension, the way the original save dialog did.

use crate::core::buffer::PixelBuffer;
use crate::core::error::{ChitraResult, MediaError};
use std::path::Path;

/// JPEG quality used when the caller does not specify one.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Decode an image file into a pixel buffer in the decoder's native
/// RGBA layout.
pub fn load_image(path: impl AsRef<Path>) -> ChitraResult<PixelBuffer> {
    let path = path.as_ref();
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("loaded {} ({}x{})", path.display(), width, height);
    Ok(PixelBuffer::from_rgba(width, height, rgba.into_raw())?)
}

/// Encode a pixel buffer to `path`, choosing the codec by extension.
///
/// Supports `png`, `jpg`/`jpeg`, and `bmp`; anything else is a
/// [`MediaError::UnsupportedFormat`].
pub fn save_image(buffer: &PixelBuffer, path: impl AsRef<Path>) -> ChitraResult<()> {
    save_image_with_quality(buffer, path, DEFAULT_JPEG_QUALITY)
}

/// [`save_image`] with an explicit JPEG quality (ignored by the lossless
/// codecs).
pub fn save_image_with_quality(
    buffer: &PixelBuffer,
    path: impl AsRef<Path>,
    quality: u8,
) -> ChitraResult<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| MediaError::MissingExtension(path.display().to_string()))?;

    let rgba = to_rgba_image(buffer);
    match ext.as_str() {
        "png" | "bmp" => rgba.save(path)?,
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel.
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let file = std::fs::File::create(path)?;
            let mut out = std::io::BufWriter::new(file);
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
            encoder.encode(
                &rgb,
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }
        other => return Err(MediaError::UnsupportedFormat(other.to_string()).into()),
    }
    log::debug!("saved {}", path.display());
    Ok(())
}

fn to_rgba_image(buffer: &PixelBuffer) -> image::RgbaImage {
    image::RgbaImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let [b, g, r, a] = buffer.pixel(x, y);
        image::Rgba([r, g, b, a])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ChitraError;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 40) as u8, (y * 40) as u8, 128, 255]);
            }
        }
        PixelBuffer::from_raw(
            width,
            height,
            width as usize * 4,
            crate::core::buffer::PixelFormat::Bgra8,
            data,
        )
        .unwrap()
    }

    #[test]
    fn test_png_round_trip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let original = gradient(5, 4);
        save_image(&original, &path).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!((loaded.width(), loaded.height()), (5, 4));
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(loaded.pixel(x, y), original.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_jpeg_save_produces_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");

        save_image_with_quality(&gradient(8, 8), &path, 85).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (8, 8));
    }

    #[test]
    fn test_bmp_save_produces_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bmp");

        save_image(&gradient(6, 3), &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (6, 3));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tiff");

        let err = save_image(&gradient(2, 2), &path).unwrap_err();
        assert!(matches!(
            err,
            ChitraError::Media(MediaError::UnsupportedFormat(ref ext)) if ext == "tiff"
        ));
    }

    #[test]
    fn test_missing_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noext");

        let err = save_image(&gradient(2, 2), &path).unwrap_err();
        assert!(matches!(
            err,
            ChitraError::Media(MediaError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_loader_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(load_image(&path).is_err());
    }
}
