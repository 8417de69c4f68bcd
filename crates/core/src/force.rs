//! Per-particle force model.
//!
//! Pure functions: given a particle's state, the field's pointer and the idle
//! clock, compute the velocity delta for this tick. Forces are velocity
//! deltas applied once per frame, not accelerations scaled by a timestep, so
//! the motion is frame-rate coupled.
//!
//! Branch selection happens once per particle per tick. A particle is
//! interacting only when the pointer is present and strictly closer than the
//! interaction radius; an absent pointer is treated as infinitely far away,
//! so no division by a zero distance is ever attempted on the idle path.

use crate::config::GlyphPhysics;
use glam::DVec2;

/// Shared inputs for one tick of the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Pointer position in the field's coordinate space, `None` when absent.
    pub pointer: Option<DVec2>,
    /// Idle-time accumulator after this tick's advance.
    pub idle_time: f64,
}

/// Which half of the force model drove a particle this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Branch {
    /// Inside the interaction radius: repulsion and strong damping.
    Interacting,
    /// Outside the radius or no pointer: breathing spring and gentle damping.
    #[default]
    Idle,
}

/// Vector from `position` to the pointer and its length.
///
/// An absent or non-finite pointer yields a zero vector at infinite distance.
pub fn pointer_offset(position: DVec2, pointer: Option<DVec2>) -> (DVec2, f64) {
    match pointer {
        Some(p) if p.is_finite() => {
            let offset = p - position;
            (offset, offset.length())
        }
        _ => (DVec2::ZERO, f64::INFINITY),
    }
}

/// Strict less-than: a particle exactly on the boundary is idle. NaN is idle.
pub fn select_branch(distance: f64, radius: f64) -> Branch {
    if distance < radius {
        Branch::Interacting
    } else {
        Branch::Idle
    }
}

/// Linear falloff: 1 at the pointer, 0 at and beyond the radius.
pub fn falloff(distance: f64, radius: f64) -> f64 {
    match select_branch(distance, radius) {
        Branch::Interacting if radius > 0.0 => ((radius - distance) / radius).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Repulsion pushing away from the pointer, scaled by falloff and `density`.
///
/// When the pointer sits exactly on the particle the direction is undefined;
/// `fallback_angle` picks one so the push stays finite and non-zero.
pub fn repulsion(offset: DVec2, distance: f64, radius: f64, density: f64, fallback_angle: f64) -> DVec2 {
    let strength = falloff(distance, radius);
    if strength == 0.0 {
        return DVec2::ZERO;
    }
    let direction = if distance > f64::EPSILON {
        offset / distance
    } else {
        DVec2::from_angle(fallback_angle)
    };
    -direction * strength * density
}

/// Breathing oscillation in [-1, 1].
pub fn breath(idle_time: f64, phase: f64) -> f64 {
    (idle_time + phase).sin()
}

/// Spring pull toward `target`.
pub fn spring(target: DVec2, position: DVec2, ease: f64) -> DVec2 {
    (target - position) * ease
}

/// Add `force` to the velocity, damp it by `friction`, then move.
pub fn integrate(position: &mut DVec2, velocity: &mut DVec2, force: DVec2, friction: f64) {
    *velocity = (*velocity + force) * friction;
    *position += *velocity;
}

/// Outcome of the glyph force model for one particle and tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphForce {
    pub branch: Branch,
    /// Velocity delta for this tick.
    pub force: DVec2,
    /// Friction of the same branch that produced `force`.
    pub friction: f64,
    /// Rendered size for this tick.
    pub size: f64,
}

/// Snapshot of the glyph particle state the force model reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphState {
    pub origin: DVec2,
    pub position: DVec2,
    pub base_size: f64,
    pub density: f64,
    pub phase_seed: f64,
}

/// Computes the glyph force for one tick.
pub fn glyph_force(state: &GlyphState, input: &TickInput, physics: &GlyphPhysics) -> GlyphForce {
    let radius = physics.interaction_radius;
    let (offset, distance) = pointer_offset(state.position, input.pointer);
    match select_branch(distance, radius) {
        Branch::Interacting => GlyphForce {
            branch: Branch::Interacting,
            force: repulsion(offset, distance, radius, state.density, state.phase_seed),
            friction: physics.interaction_friction,
            size: state.base_size,
        },
        Branch::Idle => {
            let phase = state.origin.y * physics.breathing_frequency + state.phase_seed;
            let b = breath(input.idle_time, phase);
            let target = state.origin + DVec2::splat(b * physics.breathing_position);
            GlyphForce {
                branch: Branch::Idle,
                force: spring(target, state.position, physics.ease),
                friction: physics.idle_friction,
                size: state.base_size + b * physics.breathing_size,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(position: DVec2) -> GlyphState {
        GlyphState {
            origin: DVec2::new(50.0, 50.0),
            position,
            base_size: 4.0,
            density: 26.0,
            phase_seed: 0.0,
        }
    }

    #[test]
    fn absent_pointer_is_infinitely_far() {
        let (offset, distance) = pointer_offset(DVec2::new(1.0, 2.0), None);
        assert_eq!(offset, DVec2::ZERO);
        assert!(distance.is_infinite());
        assert_eq!(select_branch(distance, 100.0), Branch::Idle);
    }

    #[test]
    fn non_finite_pointer_is_treated_as_absent() {
        let (_, distance) = pointer_offset(DVec2::ZERO, Some(DVec2::new(f64::NAN, 0.0)));
        assert!(distance.is_infinite());
    }

    #[test]
    fn boundary_distance_selects_idle() {
        assert_eq!(select_branch(100.0, 100.0), Branch::Idle);
        assert_eq!(select_branch(99.999, 100.0), Branch::Interacting);
        assert_eq!(select_branch(f64::NAN, 100.0), Branch::Idle);
    }

    #[test]
    fn falloff_is_one_at_center_and_zero_at_boundary() {
        assert!((falloff(0.0, 100.0) - 1.0).abs() < f64::EPSILON);
        assert!((falloff(50.0, 100.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(falloff(100.0, 100.0), 0.0);
        assert_eq!(falloff(150.0, 100.0), 0.0);
    }

    #[test]
    fn repulsion_points_away_from_pointer() {
        let offset = DVec2::new(10.0, 0.0);
        let push = repulsion(offset, 10.0, 100.0, 1.0, 0.0);
        assert!(push.x < 0.0);
        assert!(push.y.abs() < 1e-12);
    }

    #[test]
    fn repulsion_at_zero_distance_is_finite_and_nonzero() {
        let push = repulsion(DVec2::ZERO, 0.0, 100.0, 25.0, 1.0);
        assert!(push.is_finite());
        assert!((push.length() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn pointer_on_particle_interacts_with_finite_force() {
        let state = state_at(DVec2::new(50.0, 50.0));
        let input = TickInput {
            pointer: Some(DVec2::new(50.0, 50.0)),
            idle_time: 0.0,
        };
        let out = glyph_force(&state, &input, &GlyphPhysics::default());
        assert_eq!(out.branch, Branch::Interacting);
        assert!(out.force.is_finite());
        assert!(out.force.length() > 0.0);
        assert!((out.friction - 0.46).abs() < f64::EPSILON);
        assert_eq!(out.size, 4.0);
    }

    #[test]
    fn repulsion_strictly_decreases_until_radius_then_vanishes() {
        let physics = GlyphPhysics::default();
        let state = state_at(DVec2::new(50.0, 50.0));
        let mut previous = f64::INFINITY;
        for step in 0..=20 {
            let d = step as f64 * 5.0;
            let input = TickInput {
                pointer: Some(DVec2::new(50.0 + d, 50.0)),
                idle_time: 0.0,
            };
            let out = glyph_force(&state, &input, &physics);
            if d < physics.interaction_radius {
                let magnitude = out.force.length();
                assert!(magnitude > 0.0, "no force at d = {d}");
                assert!(magnitude < previous, "force did not decrease at d = {d}");
                previous = magnitude;
            } else {
                assert_eq!(out.branch, Branch::Idle);
            }
        }
    }

    #[test]
    fn idle_force_is_spring_toward_breathing_target() {
        let physics = GlyphPhysics {
            phase_jitter: 0.0,
            ..GlyphPhysics::default()
        };
        let state = GlyphState {
            origin: DVec2::ZERO,
            position: DVec2::new(10.0, 0.0),
            base_size: 4.0,
            density: 25.0,
            phase_seed: 0.0,
        };
        // breath = sin(0 + 0) = 0, so the target is the origin itself.
        let out = glyph_force(&state, &TickInput { pointer: None, idle_time: 0.0 }, &physics);
        assert_eq!(out.branch, Branch::Idle);
        assert!((out.force.x - (-10.0 * physics.ease)).abs() < 1e-12);
        assert!((out.friction - 0.90).abs() < f64::EPSILON);
        assert!((out.size - 4.0).abs() < 1e-12);
    }

    #[test]
    fn idle_size_breathes_with_magnitude() {
        let physics = GlyphPhysics::default();
        let state = state_at(DVec2::new(50.0, 50.0));
        let phase = 50.0 * physics.breathing_frequency;
        let idle_time = std::f64::consts::FRAC_PI_2 - phase;
        let out = glyph_force(&state, &TickInput { pointer: None, idle_time }, &physics);
        assert!((out.size - 5.0).abs() < 1e-9);
    }

    #[test]
    fn integrate_adds_then_damps_then_moves() {
        let mut position = DVec2::ZERO;
        let mut velocity = DVec2::new(1.0, 0.0);
        integrate(&mut position, &mut velocity, DVec2::new(1.0, 2.0), 0.5);
        assert_eq!(velocity, DVec2::new(1.0, 1.0));
        assert_eq!(position, DVec2::new(1.0, 1.0));
    }

    #[test]
    fn idle_friction_decays_velocity_geometrically() {
        let physics = GlyphPhysics::default();
        let mut position = DVec2::ZERO;
        let mut velocity = DVec2::new(8.0, -3.0);
        let mut previous = velocity.length();
        for _ in 0..200 {
            integrate(&mut position, &mut velocity, DVec2::ZERO, physics.idle_friction);
            let now = velocity.length();
            assert!(now <= previous * physics.idle_friction + 1e-12);
            previous = now;
        }
        assert!(previous < 1e-6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn glyph_force_is_always_finite(
                px in -500.0_f64..500.0,
                py in -500.0_f64..500.0,
                ox in -500.0_f64..500.0,
                oy in -500.0_f64..500.0,
                present: bool,
                idle_time in 0.0_f64..1e4,
            ) {
                let state = GlyphState {
                    origin: DVec2::new(ox, oy),
                    position: DVec2::new(px, py),
                    base_size: 4.0,
                    density: 27.0,
                    phase_seed: 0.3,
                };
                let pointer = present.then_some(DVec2::new(ox, oy));
                let out = glyph_force(&state, &TickInput { pointer, idle_time }, &GlyphPhysics::default());
                prop_assert!(out.force.is_finite());
                prop_assert!(out.size.is_finite());
            }

            #[test]
            fn falloff_stays_in_unit_interval(d in 0.0_f64..1e4, r in 1e-3_f64..1e3) {
                let f = falloff(d, r);
                prop_assert!((0.0..=1.0).contains(&f));
            }
        }
    }
}
