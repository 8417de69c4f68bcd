#![deny(unsafe_code)]
//! Scene registry and CPU surfaces for glyphfield.
//!
//! This crate sits between `glyphfield-core` (which defines the `Scene`,
//! `GlyphSurface` and `PointSurface` traits) and hosts such as the CLI. It
//! provides a `rusttype` raster for the text field, a perspective point
//! splatter for the cloud, name-based scene construction and PNG snapshots.

pub mod pixel;
pub mod points;
pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::DVec2;
use glyphfield_core::scene::{GlyphScene, PointScene, Scene};
use glyphfield_core::{FieldError, GlyphFieldConfig, PointCloudConfig};
use pixel::PixelBuffer;
use points::{Camera, PointCanvas};
use raster::RasterCanvas;
use serde_json::Value;
use std::path::Path;

/// All available scene modes.
const MODE_NAMES: &[&str] = &["text", "cloud"];

/// Enumeration of the scene modes, each bound to its CPU surface.
///
/// Use [`SceneKind::from_name`] for string-based construction (CLI).
#[derive(Debug)]
pub enum SceneKind {
    /// Text sampled into a field of glyph particles.
    Text(GlyphScene<RasterCanvas>),
    /// Spherical shell of points plus asset singletons.
    Cloud(PointScene<PointCanvas>),
}

impl SceneKind {
    /// Constructs a scene by mode name from partial JSON overrides.
    ///
    /// Text mode reads its font from `font`; it is an error to omit it.
    pub fn from_name(
        name: &str,
        seed: u64,
        params: &Value,
        font: Option<&Path>,
    ) -> Result<Self, FieldError> {
        match name {
            "text" => {
                let path = font.ok_or_else(|| FieldError::InvalidConfig {
                    name: "font".into(),
                    reason: "text mode needs a TrueType font".into(),
                })?;
                let canvas = RasterCanvas::from_font_file(path)?;
                Ok(SceneKind::Text(GlyphScene::new(
                    canvas,
                    GlyphFieldConfig::from_json(params),
                    seed,
                )?))
            }
            "cloud" => {
                let config = PointCloudConfig::from_json(params);
                let canvas = PointCanvas::new(Camera {
                    fov_degrees: config.camera_fov_degrees,
                    distance: config.camera_distance,
                });
                Ok(SceneKind::Cloud(PointScene::new(canvas, config, seed)?))
            }
            _ => Err(FieldError::UnknownMode(name.to_string())),
        }
    }

    /// Returns a slice of all recognized mode names.
    pub fn list_modes() -> &'static [&'static str] {
        MODE_NAMES
    }

    /// Default configuration of a mode as JSON.
    pub fn default_params(name: &str) -> Result<Value, FieldError> {
        let value = match name {
            "text" => serde_json::to_value(GlyphFieldConfig::default()),
            "cloud" => serde_json::to_value(PointCloudConfig::default()),
            _ => return Err(FieldError::UnknownMode(name.to_string())),
        };
        value.map_err(|e| FieldError::Io(e.to_string()))
    }

    /// The frame most recently drawn.
    pub fn pixels(&self) -> &PixelBuffer {
        match self {
            SceneKind::Text(s) => s.surface().pixels(),
            SceneKind::Cloud(s) => s.surface().pixels(),
        }
    }
}

impl Scene for SceneKind {
    fn rebuild(&mut self, width: usize, height: usize) {
        match self {
            SceneKind::Text(s) => s.rebuild(width, height),
            SceneKind::Cloud(s) => s.rebuild(width, height),
        }
    }

    fn set_pointer(&mut self, pointer: Option<DVec2>) {
        match self {
            SceneKind::Text(s) => s.set_pointer(pointer),
            SceneKind::Cloud(s) => s.set_pointer(pointer),
        }
    }

    fn clear(&mut self) {
        match self {
            SceneKind::Text(s) => s.clear(),
            SceneKind::Cloud(s) => s.clear(),
        }
    }

    fn tick(&mut self) {
        match self {
            SceneKind::Text(s) => s.tick(),
            SceneKind::Cloud(s) => s.tick(),
        }
    }

    fn draw(&mut self) {
        match self {
            SceneKind::Text(s) => s.draw(),
            SceneKind::Cloud(s) => s.draw(),
        }
    }

    fn dispose(&mut self) {
        match self {
            SceneKind::Text(s) => s.dispose(),
            SceneKind::Cloud(s) => s.dispose(),
        }
    }

    fn particle_count(&self) -> usize {
        match self {
            SceneKind::Text(s) => s.particle_count(),
            SceneKind::Cloud(s) => s.particle_count(),
        }
    }

    fn params(&self) -> Value {
        match self {
            SceneKind::Text(s) => s.params(),
            SceneKind::Cloud(s) => s.params(),
        }
    }
}
