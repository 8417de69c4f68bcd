//! Particle records and the shared per-tick update contract.
//!
//! There is one record per rendering mode: [`GlyphParticle`] for the 2-D
//! text field and [`PointParticle`] for the 3-D cloud. Both are plain data
//! driven by the free functions in [`crate::force`] through the [`Body`]
//! trait. Origins, densities and phase seeds are fixed at spawn and only
//! exposed through getters.

use crate::color::Srgb;
use crate::config::{GlyphFieldConfig, GlyphPhysics, PointPhysics};
use crate::force::{
    glyph_force, integrate, pointer_offset, repulsion, select_branch, Branch, GlyphState,
    TickInput,
};
use crate::prng::Xorshift64;
use crate::sampler::{GlyphSeed, Layer, PointSeed, PointVisual};
use glam::{DVec2, DVec3};

/// Rules a field of particles is advanced with.
pub trait Rules {
    /// Idle clock increment per tick.
    fn clock_step(&self) -> f64;
}

/// The update contract shared by both particle records.
pub trait Body: Sized {
    type Seed;
    type Rules: Rules;

    fn spawn(seed: &Self::Seed, rules: &Self::Rules, rng: &mut Xorshift64) -> Self;

    /// Applies one tick of the force model.
    fn advance(&mut self, input: &TickInput, rules: &Self::Rules, rng: &mut Xorshift64);

    /// Branch taken on the most recent tick.
    fn branch(&self) -> Branch;
}

/// Glyph physics plus the cosmetic rules for glyph swapping and hover color.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRules {
    pub physics: GlyphPhysics,
    pub glyphs: Vec<char>,
    pub hover_color: Srgb,
    pub base_size: f64,
    pub swap_interval_min: usize,
    pub swap_interval_span: usize,
}

impl GlyphRules {
    pub fn from_config(config: &GlyphFieldConfig) -> Self {
        Self {
            physics: config.physics,
            glyphs: config.glyphs(),
            hover_color: config.hover_color,
            base_size: config.base_size,
            swap_interval_min: config.swap_interval_min,
            swap_interval_span: config.swap_interval_span,
        }
    }
}

impl Rules for GlyphRules {
    fn clock_step(&self) -> f64 {
        self.physics.breathing_speed
    }
}

/// One glyph of the 2-D text field.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphParticle {
    origin: DVec2,
    density: f64,
    phase_seed: f64,
    swap_interval: u64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub glyph: char,
    pub base_color: Srgb,
    pub color: Srgb,
    pub base_size: f64,
    pub size: f64,
    pub layer: Layer,
    frame_count: u64,
    branch: Branch,
}

impl GlyphParticle {
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn phase_seed(&self) -> f64 {
        self.phase_seed
    }

    pub fn swap_interval(&self) -> u64 {
        self.swap_interval
    }

    fn state(&self) -> GlyphState {
        GlyphState {
            origin: self.origin,
            position: self.position,
            base_size: self.base_size,
            density: self.density,
            phase_seed: self.phase_seed,
        }
    }

    /// Advances the glyph clock and swaps the symbol when it hits the interval.
    fn tick_glyph(&mut self, glyphs: &[char], rng: &mut Xorshift64) {
        self.frame_count += 1;
        if self.frame_count % self.swap_interval == 0 {
            if let Some(&g) = rng.pick(glyphs) {
                self.glyph = g;
            }
        }
    }
}

impl Body for GlyphParticle {
    type Seed = GlyphSeed;
    type Rules = GlyphRules;

    fn spawn(seed: &GlyphSeed, rules: &GlyphRules, rng: &mut Xorshift64) -> Self {
        let physics = &rules.physics;
        let density = rng.next_f64() * physics.density_random + physics.density_base;
        let phase_seed = rng.next_f64() * physics.phase_jitter;
        let frame_count = rng.next_usize(100) as u64;
        let swap_interval =
            (rng.next_usize(rules.swap_interval_span) + rules.swap_interval_min).max(1) as u64;
        Self {
            origin: seed.origin,
            density,
            phase_seed,
            swap_interval,
            position: seed.start,
            velocity: DVec2::ZERO,
            glyph: seed.glyph,
            base_color: seed.color,
            color: seed.color,
            base_size: rules.base_size,
            size: rules.base_size,
            layer: seed.layer,
            frame_count,
            branch: Branch::Idle,
        }
    }

    fn advance(&mut self, input: &TickInput, rules: &GlyphRules, rng: &mut Xorshift64) {
        self.tick_glyph(&rules.glyphs, rng);

        let out = glyph_force(&self.state(), input, &rules.physics);
        self.branch = out.branch;
        self.size = out.size;
        self.color = match out.branch {
            Branch::Interacting => rules.hover_color,
            Branch::Idle => self.base_color,
        };
        integrate(&mut self.position, &mut self.velocity, out.force, out.friction);
    }

    fn branch(&self) -> Branch {
        self.branch
    }
}

impl Rules for PointPhysics {
    fn clock_step(&self) -> f64 {
        self.clock_step
    }
}

/// One point of the 3-D cloud: an ambient point or an asset singleton.
///
/// Pointer interaction happens in the xy plane; z is only pulled back
/// toward its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PointParticle {
    origin: DVec3,
    density: f64,
    phase_seed: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    pub visual: PointVisual,
    branch: Branch,
}

impl PointParticle {
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn phase_seed(&self) -> f64 {
        self.phase_seed
    }

    /// Wave-and-push target for this tick.
    fn target(&self, input: &TickInput, physics: &PointPhysics) -> (DVec3, Branch) {
        let xy = self.position.truncate();
        let radius = physics.interaction_radius;
        let (offset, distance) = pointer_offset(xy, input.pointer);
        let push = repulsion(offset, distance, radius, self.density, self.phase_seed);

        let t = input.idle_time * physics.wave_speed + self.phase_seed;
        let wave = DVec2::new(
            (t + xy.x * physics.wave_frequency).sin(),
            (t + xy.y * physics.wave_frequency).cos(),
        ) * physics.wave_amplitude;

        let target = DVec3::new(
            self.origin.x + wave.x + push.x,
            self.origin.y + wave.y + push.y,
            self.origin.z,
        );
        (target, select_branch(distance, radius))
    }
}

impl Body for PointParticle {
    type Seed = PointSeed;
    type Rules = PointPhysics;

    fn spawn(seed: &PointSeed, physics: &PointPhysics, rng: &mut Xorshift64) -> Self {
        Self {
            origin: seed.origin,
            density: physics.push,
            phase_seed: rng.next_f64() * physics.phase_jitter,
            position: seed.origin,
            velocity: DVec3::ZERO,
            visual: seed.visual,
            branch: Branch::Idle,
        }
    }

    fn advance(&mut self, input: &TickInput, physics: &PointPhysics, _rng: &mut Xorshift64) {
        let (target, branch) = self.target(input, physics);
        self.branch = branch;
        self.velocity = self.velocity * physics.retention + (target - self.position) * physics.ease;
        self.position += self.velocity;
    }

    fn branch(&self) -> Branch {
        self.branch
    }
}
