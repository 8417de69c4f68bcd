//! Shape sampling: turning a target shape into particle origins.
//!
//! Text mode rasterizes the target text once, reads back its alpha coverage
//! and emits one origin per covered grid cell, plus a dimmer shadow origin
//! offset by a constant vector. Shadows come first so they draw underneath.
//!
//! Point-cloud mode scatters ambient points through a spherical shell and
//! places one singleton point per external asset inside a bounding box.

use crate::color::Srgb;
use crate::config::{GlyphFieldConfig, PointCloudConfig};
use crate::mask::AlphaMask;
use crate::prng::Xorshift64;
use crate::surface::{GlyphSurface, TextureId};
use glam::{DVec2, DVec3};
use std::f64::consts::TAU;

/// Draw layer of a glyph particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Shadow,
    Main,
}

/// One sampled glyph origin and its initial visual unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSeed {
    pub origin: DVec2,
    /// Where the particle appears before flying in to its origin.
    pub start: DVec2,
    pub glyph: char,
    pub color: Srgb,
    pub layer: Layer,
}

/// Visual unit of a point particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointVisual {
    /// Ambient point with a vertex color.
    Color(Srgb),
    /// Asset singleton; `None` when its texture failed to load.
    Texture(Option<TextureId>),
}

/// One sampled point origin and its visual unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSeed {
    pub origin: DVec3,
    pub visual: PointVisual,
}

/// Grid cells whose alpha is strictly above `threshold`, row by row.
///
/// A `gap` of 0 is treated as 1.
pub fn covered_cells(mask: &AlphaMask, gap: usize, threshold: u8) -> Vec<DVec2> {
    let gap = gap.max(1);
    (0..mask.height())
        .step_by(gap)
        .flat_map(|y| (0..mask.width()).step_by(gap).map(move |x| (x, y)))
        .filter(|&(x, y)| mask.get(x, y) > threshold)
        .map(|(x, y)| DVec2::new(x as f64, y as f64))
        .collect()
}

/// Builds the shadow and main seed sets for covered cells, shadow set first.
///
/// Both passes of a cell share one initial glyph; start positions are
/// scattered uniformly over `bounds`.
pub fn glyph_seeds(
    cells: &[DVec2],
    config: &GlyphFieldConfig,
    bounds: DVec2,
    rng: &mut Xorshift64,
) -> Vec<GlyphSeed> {
    let glyphs = config.glyphs();
    let offset = DVec2::from_array(config.shadow_offset);
    let mut shadows = Vec::with_capacity(cells.len());
    let mut mains = Vec::with_capacity(cells.len());
    for &cell in cells {
        let glyph = rng.pick(&glyphs).copied().unwrap_or(' ');
        mains.push(GlyphSeed {
            origin: cell,
            start: random_point(bounds, rng),
            glyph,
            color: config.base_color,
            layer: Layer::Main,
        });
        shadows.push(GlyphSeed {
            origin: cell + offset,
            start: random_point(bounds, rng),
            glyph,
            color: config.shadow_color,
            layer: Layer::Shadow,
        });
    }
    shadows.extend(mains);
    shadows
}

fn random_point(bounds: DVec2, rng: &mut Xorshift64) -> DVec2 {
    DVec2::new(rng.next_f64() * bounds.x, rng.next_f64() * bounds.y)
}

/// Samples `config.text` on `surface` into glyph seeds.
///
/// A surface with no area yields no seeds. The text is centered with its
/// anchor pulled back by half the shadow offset so the combined main and
/// shadow layers stay centered.
pub fn sample_text<S: GlyphSurface + ?Sized>(
    surface: &mut S,
    config: &GlyphFieldConfig,
    rng: &mut Xorshift64,
) -> Vec<GlyphSeed> {
    let (w, h) = (surface.width(), surface.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let bounds = DVec2::new(w as f64, h as f64);
    let anchor = bounds / 2.0 - DVec2::from_array(config.shadow_offset) / 2.0;
    let mask = surface.rasterize_text(&config.text, config.font_size, anchor);
    let cells = covered_cells(&mask, config.gap, config.alpha_threshold);
    glyph_seeds(&cells, config, bounds, rng)
}

/// Uniform directions on the unit sphere with radius drawn from
/// `[inner, inner + thickness)`.
pub fn sample_shell(count: usize, inner: f64, thickness: f64, rng: &mut Xorshift64) -> Vec<DVec3> {
    (0..count)
        .map(|_| {
            let radius = rng.next_f64() * thickness + inner;
            let phi = (2.0 * rng.next_f64() - 1.0).acos();
            let theta = rng.next_f64() * TAU;
            DVec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            )
        })
        .collect()
}

/// Ambient point seeds colored by a vertical gradient.
pub fn ambient_seeds(config: &PointCloudConfig, rng: &mut Xorshift64) -> Vec<PointSeed> {
    sample_shell(
        config.ambient_count,
        config.shell_inner_radius,
        config.shell_thickness,
        rng,
    )
    .into_iter()
    .map(|origin| PointSeed {
        origin,
        visual: PointVisual::Color(
            config
                .gradient_low
                .lerp(config.gradient_high, (origin.y + 1.5) / 3.0),
        ),
    })
    .collect()
}

/// One singleton seed per asset texture slot, scattered in the centered box.
pub fn asset_seeds(
    config: &PointCloudConfig,
    textures: &[Option<TextureId>],
    rng: &mut Xorshift64,
) -> Vec<PointSeed> {
    let [bx, by, bz] = config.asset_box;
    textures
        .iter()
        .map(|&texture| PointSeed {
            origin: DVec3::new(
                (rng.next_f64() - 0.5) * bx,
                (rng.next_f64() - 0.5) * by,
                (rng.next_f64() - 0.5) * bz,
            ),
            visual: PointVisual::Texture(texture),
        })
        .collect()
}
