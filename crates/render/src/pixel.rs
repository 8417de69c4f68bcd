//! RGBA8 pixel buffer shared by both CPU surfaces.
//!
//! Always available (no feature gate) so the PNG snapshot path and any other
//! consumer of raw frames read the same bytes.

use glyphfield_core::Srgb;

/// Row-major RGBA8 pixels, `width * height * 4` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A transparent buffer. Zero-area buffers are valid and hold no bytes.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height).saturating_mul(4);
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reallocates to the new size; contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    /// Sets every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Source-over blends `color` at `coverage * 255` alpha into `(x, y)`.
    ///
    /// Signed coordinates so glyph boxes hanging off the left or top edge clip cleanly.
    pub fn blend(&mut self, x: i64, y: i64, color: Srgb, coverage: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = coverage.clamp(0.0, 1.0);
        if a == 0.0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let src = color.to_rgb8();
        let px = &mut self.data[idx..idx + 4];
        let dst_a = px[3] as f64 / 255.0;
        let out_a = a + dst_a * (1.0 - a);
        for c in 0..3 {
            let s = src[c] as f64 / 255.0;
            let d = px[c] as f64 / 255.0;
            let blended = if out_a > 0.0 {
                (s * a + d * dst_a * (1.0 - a)) / out_a
            } else {
                0.0
            };
            px[c] = (blended * 255.0).round() as u8;
        }
        px[3] = (out_a * 255.0).round() as u8;
    }

    /// Blends an axis-aligned square of side `side` pixels centered on `(cx, cy)`.
    pub fn fill_square(&mut self, cx: f64, cy: f64, side: f64, color: Srgb, coverage: f64) {
        let half = (side.max(1.0)) / 2.0;
        let (x0, x1) = ((cx - half).round() as i64, (cx + half).round() as i64);
        let (y0, y1) = ((cy - half).round() as i64, (cy + half).round() as i64);
        for y in y0..y1.max(y0 + 1) {
            for x in x0..x1.max(x0 + 1) {
                self.blend(x, y, color, coverage);
            }
        }
    }

    /// RGBA at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Number of pixels with non-zero alpha.
    pub fn covered(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] > 0).count()
    }
}
