//! CPU raster surface for the 2-D glyph field, backed by `rusttype`.

use crate::pixel::PixelBuffer;
use glam::DVec2;
use glyphfield_core::mask::AlphaMask;
use glyphfield_core::{FieldError, GlyphSurface, Srgb};
use rusttype::{point, Font, Scale};
use std::path::Path;
use tracing::{debug, warn};

/// Extra horizontal passes drawn over each glyph to embolden the sampling raster.
const BOLD_SPREAD: i64 = 1;

/// RGBA8 surface that rasterizes text with a TrueType font.
///
/// Without a font, `rasterize_text` covers nothing and glyphs draw as filled
/// squares, which keeps the surface usable for layout-free tests.
pub struct RasterCanvas {
    pixels: PixelBuffer,
    font: Option<Font<'static>>,
}

impl std::fmt::Debug for RasterCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCanvas")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl RasterCanvas {
    pub fn new(font: Font<'static>) -> Self {
        Self {
            pixels: PixelBuffer::default(),
            font: Some(font),
        }
    }

    pub fn without_font() -> Self {
        Self {
            pixels: PixelBuffer::default(),
            font: None,
        }
    }

    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, FieldError> {
        Font::try_from_vec(bytes)
            .map(Self::new)
            .ok_or_else(|| FieldError::AssetUnavailable {
                path: "<font bytes>".into(),
                reason: "not a TrueType or OpenType font".into(),
            })
    }

    pub fn from_font_file(path: &Path) -> Result<Self, FieldError> {
        let bytes = std::fs::read(path).map_err(|e| FieldError::AssetUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let canvas = Self::from_font_bytes(bytes).map_err(|_| {
            warn!(path = %path.display(), "font file did not parse");
            FieldError::AssetUnavailable {
                path: path.display().to_string(),
                reason: "not a TrueType or OpenType font".into(),
            }
        })?;
        debug!(path = %path.display(), "font loaded");
        Ok(canvas)
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    fn scale(size: f64) -> Scale {
        Scale::uniform(size.max(0.0) as f32)
    }
}

/// Width of a laid out run: last glyph position plus its advance.
fn run_width(font: &Font<'_>, text: &str, scale: Scale) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width)
}

impl GlyphSurface for RasterCanvas {
    fn width(&self) -> usize {
        self.pixels.width()
    }

    fn height(&self) -> usize {
        self.pixels.height()
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.pixels.resize(width, height);
    }

    fn clear(&mut self) {
        self.pixels.clear();
    }

    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        self.font
            .as_ref()
            .map_or(0.0, |font| run_width(font, text, Self::scale(font_size)) as f64)
    }

    fn rasterize_text(&mut self, text: &str, font_size: f64, anchor: DVec2) -> AlphaMask {
        let (w, h) = (self.pixels.width(), self.pixels.height());
        let mut mask = AlphaMask::new(w, h).unwrap_or_else(|_| AlphaMask::empty());
        let Some(font) = self.font.as_ref() else {
            return mask;
        };
        let scale = Self::scale(font_size);
        let v = font.v_metrics(scale);
        let start_x = anchor.x as f32 - run_width(font, text, scale) / 2.0;
        // Middle baseline: the em box straddles the anchor vertically.
        let baseline = anchor.y as f32 + (v.ascent + v.descent) / 2.0;
        for glyph in font.layout(text, scale, point(start_x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let alpha = (coverage * 255.0).round() as u8;
                let y = bb.min.y as i64 + gy as i64;
                for spread in 0..=BOLD_SPREAD {
                    let x = bb.min.x as i64 + gx as i64 + spread;
                    if x >= 0 && y >= 0 {
                        mask.cover(x as usize, y as usize, alpha);
                    }
                }
            });
        }
        mask
    }

    /// Draws `glyph` centered on `position`, horizontally by advance width and
    /// vertically by the middle of the em box.
    fn fill_glyph(&mut self, glyph: char, position: DVec2, size: f64, color: Srgb) {
        let Some(font) = self.font.as_ref() else {
            self.pixels.fill_square(position.x, position.y, size, color, 1.0);
            return;
        };
        let scale = Self::scale(size);
        let v = font.v_metrics(scale);
        let scaled = font.glyph(glyph).scaled(scale);
        let left = position.x as f32 - scaled.h_metrics().advance_width / 2.0;
        let baseline = position.y as f32 + (v.ascent + v.descent) / 2.0;
        let positioned = scaled.positioned(point(left, baseline));
        let Some(bb) = positioned.pixel_bounding_box() else {
            return;
        };
        let pixels = &mut self.pixels;
        positioned.draw(|gx, gy, coverage| {
            pixels.blend(
                bb.min.x as i64 + gx as i64,
                bb.min.y as i64 + gy as i64,
                color,
                coverage as f64,
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfield_core::scene::{GlyphScene, Scene};
    use glyphfield_core::GlyphFieldConfig;

    const FONT: &[u8] = include_bytes!("../fonts/DejaVuSansMono-Bold.ttf");

    fn font_canvas() -> RasterCanvas {
        RasterCanvas::from_font_bytes(FONT.to_vec()).unwrap()
    }

    /// Inclusive bounding box `(x0, y0, x1, y1)` of cells matching `covered`.
    fn bbox(
        width: usize,
        height: usize,
        covered: impl Fn(usize, usize) -> bool,
    ) -> Option<(usize, usize, usize, usize)> {
        let mut found: Option<(usize, usize, usize, usize)> = None;
        for y in 0..height {
            for x in 0..width {
                if covered(x, y) {
                    found = Some(match found {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        found
    }

    fn center(b: (usize, usize, usize, usize)) -> DVec2 {
        DVec2::new((b.0 + b.2) as f64 / 2.0, (b.1 + b.3) as f64 / 2.0)
    }

    #[test]
    fn resize_and_clear_track_dimensions() {
        let mut canvas = RasterCanvas::without_font();
        canvas.resize(32, 16);
        assert_eq!((canvas.width(), canvas.height()), (32, 16));
        canvas.fill_glyph('N', DVec2::new(4.0, 8.0), 4.0, Srgb::WHITE);
        assert!(canvas.pixels().covered() > 0);
        canvas.clear();
        assert_eq!(canvas.pixels().covered(), 0);
    }

    #[test]
    fn fontless_canvas_rasterizes_nothing() {
        let mut canvas = RasterCanvas::without_font();
        canvas.resize(40, 20);
        let mask = canvas.rasterize_text("NXL", 12.0, DVec2::new(20.0, 10.0));
        assert_eq!((mask.width(), mask.height()), (40, 20));
        assert!(mask.data().iter().all(|&a| a == 0));
        assert_eq!(canvas.measure_text("NXL", 12.0), 0.0);
    }

    #[test]
    fn rasterize_leaves_visible_pixels_clear() {
        let mut canvas = RasterCanvas::without_font();
        canvas.resize(10, 10);
        canvas.rasterize_text("A", 8.0, DVec2::new(5.0, 5.0));
        assert_eq!(canvas.pixels().covered(), 0);
    }

    #[test]
    fn zero_area_canvas_yields_empty_mask() {
        let mut canvas = RasterCanvas::without_font();
        let mask = canvas.rasterize_text("A", 8.0, DVec2::ZERO);
        assert!(mask.is_empty());
    }

    #[test]
    fn text_coverage_centers_on_anchor() {
        let mut canvas = font_canvas();
        canvas.resize(640, 360);
        let anchor = DVec2::new(319.0, 179.0);
        let mask = canvas.rasterize_text("NXL", 128.0, anchor);
        let b = bbox(640, 360, |x, y| mask.get(x, y) > 0).unwrap();
        let c = center(b);
        assert!((c.x - anchor.x).abs() <= 4.0, "horizontal center {c}");
        assert!((c.y - anchor.y).abs() <= 6.0, "vertical center {c}");
        assert_eq!(canvas.pixels().covered(), 0);
    }

    #[test]
    fn measured_width_matches_covered_span() {
        let mut canvas = font_canvas();
        canvas.resize(640, 360);
        let width = canvas.measure_text("NXL", 128.0);
        assert!(width > 0.0);
        let mask = canvas.rasterize_text("NXL", 128.0, DVec2::new(320.0, 180.0));
        let b = bbox(640, 360, |x, y| mask.get(x, y) > 0).unwrap();
        let span = (b.2 - b.0 + 1) as f64;
        assert!(span <= width + 2.0 * BOLD_SPREAD as f64 + 2.0);
        assert!(span > width * 0.75);
    }

    #[test]
    fn bold_spread_widens_each_glyph() {
        let mut canvas = font_canvas();
        canvas.resize(100, 100);
        let anchor = DVec2::new(50.0, 50.0);
        let mask = canvas.rasterize_text("l", 64.0, anchor);

        let font = canvas.font.as_ref().unwrap();
        let scale = RasterCanvas::scale(64.0);
        let v = font.v_metrics(scale);
        let start = point(
            anchor.x as f32 - run_width(font, "l", scale) / 2.0,
            anchor.y as f32 + (v.ascent + v.descent) / 2.0,
        );
        let glyph = font.glyph('l').scaled(scale).positioned(start);
        let bb = glyph.pixel_bounding_box().unwrap();
        let mut plain = AlphaMask::new(100, 100).unwrap();
        glyph.draw(|gx, gy, coverage| {
            let alpha = (coverage * 255.0).round() as u8;
            plain.cover((bb.min.x + gx as i32) as usize, (bb.min.y + gy as i32) as usize, alpha);
        });

        let bold = bbox(100, 100, |x, y| mask.get(x, y) > 0).unwrap();
        let thin = bbox(100, 100, |x, y| plain.get(x, y) > 0).unwrap();
        assert_eq!(bold.0, thin.0);
        assert_eq!(bold.2, thin.2 + BOLD_SPREAD as usize);
        assert_eq!((bold.1, bold.3), (thin.1, thin.3));
    }

    #[test]
    fn glyph_is_centered_on_its_position() {
        let mut canvas = font_canvas();
        canvas.resize(100, 100);
        canvas.fill_glyph('X', DVec2::new(50.0, 50.0), 20.0, Srgb::WHITE);
        let pixels = canvas.pixels();
        let b = bbox(100, 100, |x, y| pixels.pixel(x, y).is_some_and(|px| px[3] > 0)).unwrap();
        let c = center(b);
        assert!((c.x - 50.0).abs() <= 2.0, "horizontal center {c}");
        assert!((c.y - 50.0).abs() <= 3.0, "vertical center {c}");
    }

    #[test]
    fn fontless_glyph_square_is_centered() {
        let mut canvas = RasterCanvas::without_font();
        canvas.resize(20, 20);
        canvas.fill_glyph('N', DVec2::new(10.0, 10.0), 4.0, Srgb::WHITE);
        let pixels = canvas.pixels();
        let b = bbox(20, 20, |x, y| pixels.pixel(x, y).is_some_and(|px| px[3] > 0)).unwrap();
        assert_eq!(b, (8, 8, 11, 11));
    }

    #[test]
    fn default_text_scene_samples_paired_particles() {
        let mut scene = GlyphScene::new(font_canvas(), GlyphFieldConfig::default(), 7).unwrap();
        scene.rebuild(640, 360);
        let count = scene.particle_count();
        assert!(count > 0);
        assert_eq!(count % 2, 0);
        scene.clear();
        scene.tick();
        scene.draw();
        assert!(scene.surface().pixels().covered() > 0);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let err = RasterCanvas::from_font_bytes(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FieldError::AssetUnavailable { .. }));
    }

    #[test]
    fn missing_font_file_is_reported_with_path() {
        let err = RasterCanvas::from_font_file(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }
}
