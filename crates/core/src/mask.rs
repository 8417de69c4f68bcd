//! Row-major 8-bit alpha coverage read back from a rasterized shape.

use crate::error::FieldError;

/// Alpha coverage of a `width * height` raster, one byte per cell.
///
/// Unlike most buffers in this crate an empty mask is valid: a surface with
/// no area rasterizes to an empty mask and samples to zero particles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl AlphaMask {
    /// Creates a fully transparent mask.
    ///
    /// Returns `FieldError::InvalidDimensions` if `width * height` overflows.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        let len = width
            .checked_mul(height)
            .ok_or(FieldError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// A zero-area mask.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Alpha at `(x, y)`, or 0 outside the mask.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Sets alpha at `(x, y)`; writes outside the mask are ignored.
    pub fn set(&mut self, x: usize, y: usize, alpha: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = alpha;
        }
    }

    /// Raises coverage at `(x, y)` to at least `alpha`, the way overlapping
    /// glyph strokes accumulate.
    pub fn cover(&mut self, x: usize, y: usize, alpha: u8) {
        if x < self.width && y < self.height {
            let cell = &mut self.data[y * self.width + x];
            *cell = (*cell).max(alpha);
        }
    }

    /// Fills an axis-aligned rectangle, clipped to the mask.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, alpha: u8) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for yy in y.min(y_end)..y_end {
            for xx in x.min(x_end)..x_end {
                self.data[yy * self.width + xx] = alpha;
            }
        }
    }
}
