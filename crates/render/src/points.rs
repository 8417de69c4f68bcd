//! CPU point-sprite surface for the 3-D cloud.
//!
//! Points are rotated about y, projected through a perspective camera on the
//! +z axis looking at the origin, and splatted as size-attenuated squares.
//! Textured geometries sample their sprite with nearest-neighbor lookup.

use crate::pixel::PixelBuffer;
use glam::{DVec2, DVec3};
use glyphfield_core::surface::{GeometryId, PointMaterial, TextureId};
use glyphfield_core::{FieldError, PointSurface, Srgb};
use std::collections::HashMap;

const NEAR_PLANE: f64 = 0.1;

/// Perspective camera on the +z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_degrees: f64,
    pub distance: f64,
}

/// A point projected to pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub pixel: DVec2,
    /// Pixels per world unit at the point's depth.
    pub scale: f64,
}

impl Camera {
    /// Projects `p` for a `width` x `height` viewport, or `None` behind the near plane.
    pub fn project(&self, p: DVec3, width: usize, height: usize) -> Option<Projected> {
        if width == 0 || height == 0 {
            return None;
        }
        let depth = self.distance - p.z;
        if depth < NEAR_PLANE {
            return None;
        }
        let (w, h) = (width as f64, height as f64);
        let focal = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();
        let aspect = w / h;
        let ndc = DVec2::new(focal / aspect * p.x / depth, focal * p.y / depth);
        Some(Projected {
            pixel: DVec2::new((ndc.x + 1.0) / 2.0 * w, (1.0 - ndc.y) / 2.0 * h),
            scale: focal / depth * h / 2.0,
        })
    }
}

#[derive(Debug, Clone)]
struct Geometry {
    positions: Vec<DVec3>,
    colors: Option<Vec<Srgb>>,
}

#[derive(Debug, Clone)]
struct Sprite {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl Sprite {
    /// Color and alpha at normalized `(u, v)`.
    fn sample(&self, u: f64, v: f64) -> Option<(Srgb, f64)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x = ((u * self.width as f64) as usize).min(self.width - 1);
        let y = ((v * self.height as f64) as usize).min(self.height - 1);
        let idx = (y * self.width + x) * 4;
        let px = self.rgba.get(idx..idx + 4)?;
        let color = Srgb {
            r: px[0] as f64 / 255.0,
            g: px[1] as f64 / 255.0,
            b: px[2] as f64 / 255.0,
        };
        Some((color, px[3] as f64 / 255.0))
    }
}

/// RGBA8 surface that owns point geometries and sprite textures.
#[derive(Debug)]
pub struct PointCanvas {
    pixels: PixelBuffer,
    camera: Camera,
    next_id: u64,
    geometries: HashMap<u64, Geometry>,
    sprites: HashMap<u64, Sprite>,
}

impl PointCanvas {
    pub fn new(camera: Camera) -> Self {
        Self {
            pixels: PixelBuffer::default(),
            camera,
            next_id: 0,
            geometries: HashMap::new(),
            sprites: HashMap::new(),
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Live geometry buffers.
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Live textures.
    pub fn texture_count(&self) -> usize {
        self.sprites.len()
    }

    /// Registers an in-memory RGBA8 sprite.
    pub fn insert_texture(
        &mut self,
        width: usize,
        height: usize,
        rgba: Vec<u8>,
    ) -> Result<TextureId, FieldError> {
        if rgba.len() != width.saturating_mul(height).saturating_mul(4) {
            return Err(FieldError::InvalidDimensions);
        }
        let id = self.fresh_id();
        self.sprites.insert(
            id,
            Sprite {
                width,
                height,
                rgba,
            },
        );
        Ok(TextureId(id))
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn rotate_y(p: DVec3, angle: f64) -> DVec3 {
    let (sin, cos) = angle.sin_cos();
    DVec3::new(p.x * cos + p.z * sin, p.y, -p.x * sin + p.z * cos)
}

impl PointSurface for PointCanvas {
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

    fn create_geometry(&mut self, positions: &[DVec3], colors: Option<&[Srgb]>) -> GeometryId {
        let id = self.fresh_id();
        self.geometries.insert(
            id,
            Geometry {
                positions: positions.to_vec(),
                colors: colors.map(<[Srgb]>::to_vec),
            },
        );
        GeometryId(id)
    }

    fn update_geometry(&mut self, id: GeometryId, positions: &[DVec3]) {
        if let Some(geometry) = self.geometries.get_mut(&id.0) {
            geometry.positions.clear();
            geometry.positions.extend_from_slice(positions);
        }
    }

    fn dispose_geometry(&mut self, id: GeometryId) {
        self.geometries.remove(&id.0);
    }

    #[cfg(feature = "png")]
    fn load_texture(&mut self, path: &str) -> Result<TextureId, FieldError> {
        let img = image::open(path)
            .map_err(|e| FieldError::AssetUnavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        let (w, h) = (img.width() as usize, img.height() as usize);
        tracing::debug!(%path, width = w, height = h, "sprite texture loaded");
        self.insert_texture(w, h, img.into_raw())
    }

    #[cfg(not(feature = "png"))]
    fn load_texture(&mut self, path: &str) -> Result<TextureId, FieldError> {
        Err(FieldError::AssetUnavailable {
            path: path.to_string(),
            reason: "built without image support".into(),
        })
    }

    fn dispose_texture(&mut self, id: TextureId) {
        self.sprites.remove(&id.0);
    }

    fn draw_points(&mut self, id: GeometryId, material: &PointMaterial, rotation_y: f64) {
        let Some(geometry) = self.geometries.get(&id.0) else {
            return;
        };
        let sprite = material.texture.and_then(|t| self.sprites.get(&t.0));
        let (w, h) = (self.pixels.width(), self.pixels.height());
        for (i, &p) in geometry.positions.iter().enumerate() {
            let Some(proj) = self.camera.project(rotate_y(p, rotation_y), w, h) else {
                continue;
            };
            let side = (material.size * proj.scale).max(1.0);
            match sprite {
                Some(sprite) => {
                    let x0 = proj.pixel.x - side / 2.0;
                    let y0 = proj.pixel.y - side / 2.0;
                    let n = side.ceil() as i64;
                    for sy in 0..n {
                        for sx in 0..n {
                            let (u, v) = ((sx as f64 + 0.5) / side, (sy as f64 + 0.5) / side);
                            if let Some((color, alpha)) = sprite.sample(u, v) {
                                self.pixels.blend(
                                    (x0 + sx as f64) as i64,
                                    (y0 + sy as f64) as i64,
                                    color,
                                    alpha * material.opacity,
                                );
                            }
                        }
                    }
                }
                None => {
                    let color = geometry
                        .colors
                        .as_ref()
                        .and_then(|c| c.get(i).copied())
                        .unwrap_or(Srgb::WHITE);
                    self.pixels
                        .fill_square(proj.pixel.x, proj.pixel.y, side, color, material.opacity);
                }
            }
        }
    }
}
