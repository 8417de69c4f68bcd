#![deny(unsafe_code)]
//! Core of the glyphfield particle engine.
//!
//! Samples a target shape (rasterized text or a spherical shell) into particle
//! origins, advances each particle with a pointer-repulsion and breathing
//! spring force model, and drives drawing through the `Scene` trait and a
//! cancellable `RenderLoop`. Pixels and GPU resources stay behind the
//! `GlyphSurface` and `PointSurface` traits.

pub mod color;
pub mod config;
pub mod error;
pub mod force;
pub mod input;
pub mod mask;
pub mod params;
pub mod particle;
pub mod prng;
pub mod render_loop;
pub mod sampler;
pub mod scene;
pub mod schedule;
pub mod simulation;
pub mod surface;

pub use color::Srgb;
pub use config::{GlyphFieldConfig, GlyphPhysics, PointCloudConfig, PointPhysics};
pub use error::FieldError;
pub use input::{InputEvent, InteractionSource};
pub use mask::AlphaMask;
pub use particle::{Body, GlyphParticle, PointParticle};
pub use prng::Xorshift64;
pub use render_loop::{LoopState, RenderLoop};
pub use scene::{GlyphScene, PointScene, Scene};
pub use schedule::{FrameScheduler, FrameToken, QueuedScheduler};
pub use simulation::FieldSimulation;
pub use surface::{GlyphSurface, PointSurface};
