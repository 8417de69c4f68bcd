//! The particle field: particle collection plus shared pointer and idle clock.

use crate::force::{Branch, TickInput};
use crate::particle::{Body, Rules};
use crate::prng::Xorshift64;
use glam::DVec2;

/// Owns a particle set and advances it one tick at a time.
///
/// Particles never interact with each other, so a tick is a single pass in
/// collection order. Collection order only decides draw stacking.
#[derive(Debug, Clone)]
pub struct FieldSimulation<P: Body> {
    particles: Vec<P>,
    rules: P::Rules,
    pointer: Option<DVec2>,
    idle_time: f64,
    ticks: u64,
    rng: Xorshift64,
}

impl<P: Body> FieldSimulation<P> {
    /// Creates an empty field. `seed` drives per-particle randomness.
    pub fn new(rules: P::Rules, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rules,
            pointer: None,
            idle_time: 0.0,
            ticks: 0,
            rng: Xorshift64::new(seed),
        }
    }

    /// Records the pointer for the next tick. `None` means no pointer is present.
    pub fn set_pointer(&mut self, pointer: Option<DVec2>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    /// Advances the idle clock, then applies the force model to every particle once.
    pub fn tick(&mut self) {
        self.idle_time += self.rules.clock_step();
        self.ticks += 1;
        let input = TickInput {
            pointer: self.pointer,
            idle_time: self.idle_time,
        };
        for particle in &mut self.particles {
            particle.advance(&input, &self.rules, &mut self.rng);
        }
    }

    /// Discards every particle and spawns a fresh set from `seeds`.
    ///
    /// The new collection is fully built before it replaces the old one.
    pub fn rebuild(&mut self, seeds: &[P::Seed]) {
        let fresh: Vec<P> = seeds
            .iter()
            .map(|seed| P::spawn(seed, &self.rules, &mut self.rng))
            .collect();
        self.particles = fresh;
    }

    /// Drops every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn particles(&self) -> &[P] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn idle_time(&self) -> f64 {
        self.idle_time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rules(&self) -> &P::Rules {
        &self.rules
    }

    /// Number of particles that took the interaction branch on the last tick.
    pub fn interacting_count(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| p.branch() == Branch::Interacting)
            .count()
    }
}
