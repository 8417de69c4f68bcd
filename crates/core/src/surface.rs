//! Drawable surface contracts consumed by the scenes.
//!
//! The core never touches pixels or GPU buffers directly. A 2-D glyph field
//! draws through a [`GlyphSurface`]; a 3-D point cloud draws through a
//! [`PointSurface`] that hands out geometry and texture handles. Handles are
//! plain ids: disposing an id the surface no longer knows is a no-op, so
//! teardown can run more than once without faulting.

use crate::color::Srgb;
use crate::error::FieldError;
use crate::mask::AlphaMask;
use glam::{DVec2, DVec3};

/// A 2-D raster surface that can rasterize text and draw colored glyphs.
pub trait GlyphSurface {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Resizes the backing raster. Contents after a resize are unspecified.
    fn resize(&mut self, width: usize, height: usize);

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Horizontal advance of `text` at `font_size` in surface pixels.
    fn measure_text(&self, text: &str, font_size: f64) -> f64;

    /// Rasterizes `text` in bold, centered horizontally and vertically on
    /// `anchor`, and returns the alpha coverage of the full surface.
    ///
    /// The rasterization happens off-surface: visible contents are left clear.
    fn rasterize_text(&mut self, text: &str, font_size: f64, anchor: DVec2) -> AlphaMask;

    /// Draws one glyph with its baseline-left corner at `position`.
    fn fill_glyph(&mut self, glyph: char, position: DVec2, size: f64, color: Srgb);
}

/// Handle to a point geometry buffer owned by a [`PointSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u64);

/// Handle to a texture owned by a [`PointSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Material used when drawing a point geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Point size in world units.
    pub size: f64,
    pub opacity: f64,
    /// Sprite texture; `None` draws per-vertex colors.
    pub texture: Option<TextureId>,
}

/// A 3-D surface drawing point geometries through a perspective camera.
pub trait PointSurface {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Resizes the viewport and updates the camera aspect.
    fn resize(&mut self, width: usize, height: usize);

    fn clear(&mut self);

    /// Allocates a geometry buffer. `colors`, when given, must match `positions` in length.
    fn create_geometry(&mut self, positions: &[DVec3], colors: Option<&[Srgb]>) -> GeometryId;

    /// Overwrites the positions of an existing geometry.
    fn update_geometry(&mut self, id: GeometryId, positions: &[DVec3]);

    fn dispose_geometry(&mut self, id: GeometryId);

    fn load_texture(&mut self, path: &str) -> Result<TextureId, FieldError>;

    fn dispose_texture(&mut self, id: TextureId);

    /// Draws a geometry rotated by `rotation_y` radians about the y axis.
    fn draw_points(&mut self, id: GeometryId, material: &PointMaterial, rotation_y: f64);
}
