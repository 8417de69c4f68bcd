//! Scenes: a sampled particle field bound to the surface it draws on.
//!
//! [`GlyphScene`] drives the 2-D text field, [`PointScene`] the 3-D point
//! cloud. Both implement the object-safe [`Scene`] trait that the render
//! loop drives, so a host can hold either as `Box<dyn Scene>`.

use crate::config::{GlyphFieldConfig, PointCloudConfig};
use crate::error::FieldError;
use crate::particle::{GlyphParticle, GlyphRules, PointParticle};
use crate::prng::Xorshift64;
use crate::sampler::{ambient_seeds, asset_seeds, sample_text, PointVisual};
use crate::simulation::FieldSimulation;
use crate::surface::{GeometryId, GlyphSurface, PointMaterial, PointSurface, TextureId};
use glam::{DVec2, DVec3};
use serde_json::Value;
use tracing::{debug, warn};

/// Salt separating the sampling stream from the per-particle stream.
const SAMPLER_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// A particle field plus its drawing surface, driven once per frame.
pub trait Scene {
    /// Resizes the surface, re-samples the shape and replaces every particle.
    fn rebuild(&mut self, width: usize, height: usize);

    /// Pointer position in surface pixels, `None` when the pointer left.
    fn set_pointer(&mut self, pointer: Option<DVec2>);

    /// Clears the surface ahead of a new frame.
    fn clear(&mut self);

    /// Advances the field one tick.
    fn tick(&mut self);

    /// Draws the current particle state.
    fn draw(&mut self);

    /// Releases surface resources. Calling it again is a no-op.
    fn dispose(&mut self);

    fn particle_count(&self) -> usize;

    /// Effective configuration as JSON.
    fn params(&self) -> Value;
}

/// Text rendered as a field of drifting glyphs.
#[derive(Debug)]
pub struct GlyphScene<S: GlyphSurface> {
    surface: S,
    config: GlyphFieldConfig,
    field: FieldSimulation<GlyphParticle>,
    rng: Xorshift64,
    disposed: bool,
}

impl<S: GlyphSurface> GlyphScene<S> {
    /// Validates `config` and binds an empty field to `surface`.
    ///
    /// The field stays empty until the first [`Scene::rebuild`].
    pub fn new(surface: S, config: GlyphFieldConfig, seed: u64) -> Result<Self, FieldError> {
        config.validate()?;
        Ok(Self {
            surface,
            field: FieldSimulation::new(GlyphRules::from_config(&config), seed),
            config,
            rng: Xorshift64::new(seed ^ SAMPLER_SALT),
            disposed: false,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn field(&self) -> &FieldSimulation<GlyphParticle> {
        &self.field
    }

    pub fn config(&self) -> &GlyphFieldConfig {
        &self.config
    }

    /// Replaces the text and rebuilds at the current surface size.
    pub fn set_text(&mut self, text: &str) {
        self.config.text = text.to_string();
        let (w, h) = (self.surface.width(), self.surface.height());
        self.rebuild(w, h);
    }
}

impl<S: GlyphSurface> Scene for GlyphScene<S> {
    fn rebuild(&mut self, width: usize, height: usize) {
        if self.disposed {
            return;
        }
        self.surface.resize(width, height);
        let seeds = sample_text(&mut self.surface, &self.config, &mut self.rng);
        self.field.rebuild(&seeds);
        debug!(
            width,
            height,
            text_width = self.surface.measure_text(&self.config.text, self.config.font_size),
            particles = self.field.len(),
            class = %self.config.class_name,
            "glyph field rebuilt"
        );
    }

    fn set_pointer(&mut self, pointer: Option<DVec2>) {
        self.field.set_pointer(pointer);
    }

    fn clear(&mut self) {
        self.surface.clear();
    }

    fn tick(&mut self) {
        self.field.tick();
    }

    fn draw(&mut self) {
        for p in self.field.particles() {
            self.surface.fill_glyph(p.glyph, p.position, p.size, p.color);
        }
    }

    fn dispose(&mut self) {
        self.field.clear();
        self.disposed = true;
    }

    fn particle_count(&self) -> usize {
        self.field.len()
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.config).unwrap_or(Value::Null)
    }
}

/// Per-asset surface resources.
#[derive(Debug, Clone)]
struct AssetSlot {
    texture: Option<TextureId>,
    geometry: Option<GeometryId>,
}

/// A rotating shell of points plus one textured singleton per asset.
#[derive(Debug)]
pub struct PointScene<S: PointSurface> {
    surface: S,
    config: PointCloudConfig,
    ambient: FieldSimulation<PointParticle>,
    assets: FieldSimulation<PointParticle>,
    ambient_geometry: Option<GeometryId>,
    slots: Vec<AssetSlot>,
    rng: Xorshift64,
    disposed: bool,
}

impl<S: PointSurface> PointScene<S> {
    /// Validates `config` and loads one texture per asset path.
    ///
    /// A texture that fails to load is logged and leaves its singleton
    /// untextured; it never aborts the scene.
    pub fn new(mut surface: S, config: PointCloudConfig, seed: u64) -> Result<Self, FieldError> {
        config.validate()?;
        let slots = config
            .assets
            .iter()
            .map(|path| {
                let texture = match surface.load_texture(path) {
                    Ok(id) => Some(id),
                    Err(err) => {
                        warn!(%path, error = %err, "asset texture unavailable");
                        None
                    }
                };
                AssetSlot {
                    texture,
                    geometry: None,
                }
            })
            .collect();
        Ok(Self {
            surface,
            ambient: FieldSimulation::new(config.ambient, seed),
            assets: FieldSimulation::new(config.asset_physics, seed.rotate_left(17)),
            config,
            ambient_geometry: None,
            slots,
            rng: Xorshift64::new(seed ^ SAMPLER_SALT),
            disposed: false,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn ambient(&self) -> &FieldSimulation<PointParticle> {
        &self.ambient
    }

    pub fn assets(&self) -> &FieldSimulation<PointParticle> {
        &self.assets
    }

    pub fn config(&self) -> &PointCloudConfig {
        &self.config
    }

    /// Cloud rotation about y at the current idle time.
    pub fn rotation(&self) -> f64 {
        self.config.spin * self.ambient.idle_time()
    }

    /// Maps surface pixels to pointer space: normalized device coordinates
    /// (y up) scaled by 2.
    pub fn pointer_space(&self, pixel: DVec2) -> Option<DVec2> {
        let (w, h) = (self.surface.width(), self.surface.height());
        if w == 0 || h == 0 || !pixel.is_finite() {
            return None;
        }
        let ndc = DVec2::new(pixel.x / w as f64 * 2.0 - 1.0, -(pixel.y / h as f64 * 2.0 - 1.0));
        Some(ndc * 2.0)
    }

    fn release_geometry(&mut self) {
        if let Some(id) = self.ambient_geometry.take() {
            self.surface.dispose_geometry(id);
        }
        for slot in &mut self.slots {
            if let Some(id) = slot.geometry.take() {
                self.surface.dispose_geometry(id);
            }
        }
    }
}

impl<S: PointSurface> Scene for PointScene<S> {
    fn rebuild(&mut self, width: usize, height: usize) {
        if self.disposed {
            return;
        }
        self.release_geometry();
        self.surface.resize(width, height);
        if width == 0 || height == 0 {
            self.ambient.rebuild(&[]);
            self.assets.rebuild(&[]);
            debug!(width, height, "point cloud emptied on zero-area surface");
            return;
        }

        let seeds = ambient_seeds(&self.config, &mut self.rng);
        self.ambient.rebuild(&seeds);
        let positions: Vec<DVec3> = seeds.iter().map(|s| s.origin).collect();
        let colors: Vec<_> = seeds
            .iter()
            .filter_map(|s| match s.visual {
                PointVisual::Color(c) => Some(c),
                PointVisual::Texture(_) => None,
            })
            .collect();
        self.ambient_geometry = Some(self.surface.create_geometry(&positions, Some(&colors)));

        let textures: Vec<Option<TextureId>> = self.slots.iter().map(|s| s.texture).collect();
        let seeds = asset_seeds(&self.config, &textures, &mut self.rng);
        self.assets.rebuild(&seeds);
        for (slot, seed) in self.slots.iter_mut().zip(&seeds) {
            slot.geometry = Some(self.surface.create_geometry(&[seed.origin], None));
        }
        debug!(
            width,
            height,
            ambient = self.ambient.len(),
            assets = self.assets.len(),
            "point cloud rebuilt"
        );
    }

    fn set_pointer(&mut self, pointer: Option<DVec2>) {
        let mapped = pointer.and_then(|p| self.pointer_space(p));
        self.ambient.set_pointer(mapped);
        self.assets.set_pointer(mapped);
    }

    fn clear(&mut self) {
        self.surface.clear();
    }

    fn tick(&mut self) {
        self.ambient.tick();
        self.assets.tick();
        if let Some(id) = self.ambient_geometry {
            let positions: Vec<DVec3> = self.ambient.particles().iter().map(|p| p.position).collect();
            self.surface.update_geometry(id, &positions);
        }
        for (slot, particle) in self.slots.iter().zip(self.assets.particles()) {
            if let Some(id) = slot.geometry {
                self.surface.update_geometry(id, &[particle.position]);
            }
        }
    }

    fn draw(&mut self) {
        let rotation = self.rotation();
        if let Some(id) = self.ambient_geometry {
            let material = PointMaterial {
                size: self.config.point_size,
                opacity: self.config.opacity,
                texture: None,
            };
            self.surface.draw_points(id, &material, rotation);
        }
        for slot in &self.slots {
            // An asset without a texture stays invisible.
            if let (Some(id), Some(texture)) = (slot.geometry, slot.texture) {
                let material = PointMaterial {
                    size: self.config.asset_size,
                    opacity: self.config.asset_opacity,
                    texture: Some(texture),
                };
                self.surface.draw_points(id, &material, rotation);
            }
        }
    }

    fn dispose(&mut self) {
        self.release_geometry();
        for slot in &mut self.slots {
            if let Some(id) = slot.texture.take() {
                self.surface.dispose_texture(id);
            }
        }
        self.ambient.clear();
        self.assets.clear();
        self.disposed = true;
    }

    fn particle_count(&self) -> usize {
        self.ambient.len() + self.assets.len()
    }

    fn params(&self) -> Value {
        serde_json::to_value(&self.config).unwrap_or(Value::Null)
    }
}


#[cfg(test)]
mod tests {
    use super::recording::{RecordingGlyphSurface, RecordingPointSurface};
    use super::*;
    use crate::sampler::Layer;

    fn glyph_scene() -> GlyphScene<RecordingGlyphSurface> {
        GlyphScene::new(RecordingGlyphSurface::default(), GlyphFieldConfig::default(), 11).unwrap()
    }

    fn cloud_config(assets: &[&str]) -> PointCloudConfig {
        PointCloudConfig {
            ambient_count: 200,
            assets: assets.iter().map(|s| s.to_string()).collect(),
            ..PointCloudConfig::default()
        }
    }

    fn point_scene(assets: &[&str]) -> PointScene<RecordingPointSurface> {
        PointScene::new(RecordingPointSurface::default(), cloud_config(assets), 5).unwrap()
    }

    #[test]
    fn glyph_scene_rebuild_samples_block_with_shadows() {
        let mut scene = glyph_scene();
        scene.rebuild(100, 60);
        // A 20x10 block at gap 2 covers 10x5 cells, doubled by the shadow layer.
        assert_eq!(scene.particle_count(), 100);
        let shadows = scene
            .field()
            .particles()
            .iter()
            .take_while(|p| p.layer == Layer::Shadow)
            .count();
        assert_eq!(shadows, 50);
    }

    #[test]
    fn glyph_scene_anchor_is_offset_by_half_the_shadow() {
        let mut scene = glyph_scene();
        scene.rebuild(100, 60);
        assert_eq!(scene.surface().last_anchor, Some(DVec2::new(49.0, 29.0)));
    }

    #[test]
    fn zero_area_surface_yields_no_particles() {
        let mut scene = glyph_scene();
        scene.rebuild(0, 0);
        assert_eq!(scene.particle_count(), 0);
        scene.tick();
        scene.draw();
        assert!(scene.surface().drawn.is_empty());
    }

    #[test]
    fn glyph_scene_draws_one_glyph_per_particle() {
        let mut scene = glyph_scene();
        scene.rebuild(100, 60);
        scene.clear();
        scene.tick();
        scene.draw();
        assert_eq!(scene.surface().drawn.len(), scene.particle_count());
    }

    #[test]
    fn empty_text_yields_no_particles() {
        let mut scene = glyph_scene();
        scene.rebuild(100, 60);
        scene.set_text("");
        assert_eq!(scene.particle_count(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GlyphFieldConfig {
            gap: 0,
            ..GlyphFieldConfig::default()
        };
        assert!(GlyphScene::new(RecordingGlyphSurface::default(), config, 1).is_err());
    }

    #[test]
    fn disposed_glyph_scene_ignores_rebuild() {
        let mut scene = glyph_scene();
        scene.rebuild(100, 60);
        scene.dispose();
        scene.dispose();
        scene.rebuild(100, 60);
        assert_eq!(scene.particle_count(), 0);
    }

    #[test]
    fn point_scene_builds_ambient_and_asset_particles() {
        let mut scene = point_scene(&["a.png", "b.png"]);
        scene.rebuild(80, 60);
        assert_eq!(scene.ambient().len(), 200);
        assert_eq!(scene.assets().len(), 2);
        assert_eq!(scene.surface().geometries.len(), 3);
        assert_eq!(scene.surface().textures.len(), 2);
    }

    #[test]
    fn failed_texture_leaves_asset_invisible_but_present() {
        let mut scene = point_scene(&["ok.png", "missing.png"]);
        scene.rebuild(80, 60);
        assert_eq!(scene.assets().len(), 2);
        scene.clear();
        scene.tick();
        scene.draw();
        // Ambient cloud plus the one textured asset.
        assert_eq!(scene.surface().draws.len(), 2);
        assert!(matches!(
            scene.assets().particles()[1].visual,
            PointVisual::Texture(None)
        ));
    }

    #[test]
    fn zero_area_cloud_yields_no_particles_or_geometry() {
        let mut scene = point_scene(&["a.png"]);
        scene.rebuild(80, 60);
        scene.rebuild(0, 0);
        assert_eq!(scene.particle_count(), 0);
        assert!(scene.surface().geometries.is_empty());
        assert_eq!(scene.surface().textures.len(), 1);
        scene.clear();
        scene.tick();
        scene.draw();
        assert!(scene.surface().draws.is_empty());

        scene.rebuild(80, 60);
        assert_eq!(scene.particle_count(), 201);
        assert_eq!(scene.surface().geometries.len(), 2);
    }

    #[test]
    fn asset_sprites_use_configured_opacity() {
        let mut scene = point_scene(&["a.png"]);
        scene.rebuild(80, 60);
        scene.draw();
        let draws = &scene.surface().draws;
        assert_eq!(draws.len(), 2);
        assert!(draws[1].1.texture.is_some());
        assert!((draws[1].1.opacity - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn rebuild_releases_previous_geometry() {
        let mut scene = point_scene(&["a.png"]);
        scene.rebuild(80, 60);
        scene.rebuild(120, 90);
        let surface = scene.surface();
        assert_eq!(surface.geometries.len(), 2);
        assert_eq!(surface.created_geometries, 4);
        assert_eq!(surface.disposed_geometries, 2);
    }

    #[test]
    fn dispose_releases_every_resource_once() {
        let mut scene = point_scene(&["a.png", "b.png", "missing.png"]);
        scene.rebuild(80, 60);
        scene.dispose();
        scene.dispose();
        let surface = scene.surface();
        assert!(surface.geometries.is_empty());
        assert!(surface.textures.is_empty());
        assert_eq!(surface.disposed_geometries, surface.created_geometries);
        assert_eq!(surface.disposed_textures, 2);
        assert_eq!(scene.particle_count(), 0);
    }

    #[test]
    fn pointer_maps_to_scaled_device_coordinates() {
        let mut scene = point_scene(&[]);
        scene.rebuild(200, 100);
        assert_eq!(scene.pointer_space(DVec2::new(100.0, 50.0)), Some(DVec2::ZERO));
        assert_eq!(scene.pointer_space(DVec2::new(0.0, 0.0)), Some(DVec2::new(-2.0, 2.0)));
        assert_eq!(scene.pointer_space(DVec2::new(200.0, 100.0)), Some(DVec2::new(2.0, -2.0)));
        scene.set_pointer(Some(DVec2::new(100.0, 50.0)));
        assert_eq!(scene.ambient().pointer(), Some(DVec2::ZERO));
        scene.set_pointer(None);
        assert_eq!(scene.assets().pointer(), None);
    }

    #[test]
    fn cloud_rotates_with_idle_time() {
        let mut scene = point_scene(&[]);
        scene.rebuild(80, 60);
        for _ in 0..60 {
            scene.tick();
        }
        assert!((scene.rotation() - 0.05).abs() < 1e-9);
        scene.draw();
        let (_, material, rotation) = scene.surface().draws[0];
        assert!(material.texture.is_none());
        assert!((rotation - 0.05).abs() < 1e-9);
    }

    #[test]
    fn scene_trait_is_object_safe() {
        let mut scenes: Vec<Box<dyn Scene>> = Vec::new();
        scenes.push(Box::new(glyph_scene()));
        scenes.push(Box::new(point_scene(&[])));
        for scene in &mut scenes {
            scene.rebuild(64, 48);
            scene.tick();
            assert!(scene.particle_count() > 0);
            assert!(scene.params().is_object());
        }
    }
}
