//! PNG snapshots of a rendered frame.
//!
//! Feature-gated behind `png` (default on) so the surfaces can be used
//! without pulling in the `image` crate.

use crate::pixel::PixelBuffer;
use glyphfield_core::FieldError;
use std::path::Path;

/// Writes the buffer as an RGBA PNG.
///
/// Returns `FieldError::InvalidDimensions` for an empty buffer or one whose
/// dimensions overflow `u32`, and `FieldError::Io` on write failure.
pub fn write_png(pixels: &PixelBuffer, path: &Path) -> Result<(), FieldError> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(FieldError::InvalidDimensions);
    }
    let w = u32::try_from(pixels.width()).map_err(|_| FieldError::InvalidDimensions)?;
    let h = u32::try_from(pixels.height()).map_err(|_| FieldError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, pixels.data().to_vec())
        .ok_or_else(|| FieldError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FieldError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfield_core::Srgb;

    #[test]
    fn write_png_round_trip() {
        let mut pixels = PixelBuffer::new(16, 8);
        pixels.fill_square(4.0, 4.0, 2.0, Srgb::WHITE, 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&pixels, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 8);
        assert_eq!(img.as_raw().as_slice(), pixels.data());
    }

    #[test]
    fn empty_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(&PixelBuffer::new(0, 0), &dir.path().join("x.png")).unwrap_err();
        assert!(matches!(err, FieldError::InvalidDimensions));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let pixels = PixelBuffer::new(2, 2);
        let err = write_png(&pixels, Path::new("/nonexistent/dir/frame.png")).unwrap_err();
        assert!(matches!(err, FieldError::Io(_)));
    }
}
