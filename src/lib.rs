//! # Particle Field
//!
//! A CPU particle simulation core: a fixed population of particles is spawned
//! from a cone/disc emitter, pulled down by gravity and bounced off static
//! spheres and the ground plane.
//!
//! The crate owns no rendering. A driver calls [`ParticleField::step`] once per
//! frame and reads the particles back (or the packed [`ParticleInstance`] view)
//! to draw them.
//!
//! ## Quick Start
//!
//! ```
//! use particle_field::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut field = ParticleField::new(rand::rngs::SmallRng::seed_from_u64(7))
//!     .with_emitter(Emitter::new(1.0, 1.0, Mat4::IDENTITY).unwrap())
//!     .with_spheres(&[Sphere::new(Vec3::new(0.0, 3.0, 0.0), 1.0)])
//!     .unwrap()
//!     .with_particle_count(1_000);
//!
//! for _ in 0..60 {
//!     field.step(1.0 / 60.0).unwrap();
//! }
//! assert_eq!(field.particles().len(), 1_000);
//! ```
//!
//! ## Core Concepts
//!
//! ### Lifespan and respawn
//!
//! Every particle carries a lifespan in seconds. Each step subtracts the
//! elapsed time; once it drops below zero the particle is re-emitted in place
//! and given a fresh lifespan. A newborn particle does not move or collide in
//! the step that created it.
//!
//! ### Collisions
//!
//! | Obstacle | Response |
//! |----------|----------|
//! | [`Sphere`] | pushed to the surface, velocity redirected along the normal at half speed |
//! | Ground (`y = 0`) | clamped to `y = radius`, horizontal speed damped, vertical speed inverted |
//!
//! Spheres are tested in the order they were configured and the first one
//! that contains the particle wins.
//!
//! ### Randomness
//!
//! All jitter comes from a [`RandomSource`]. Any `rand` generator works, and
//! [`SequenceSource`] replays scripted values for deterministic tests.

mod clock;
mod config;
mod emitter;
mod error;
mod field;
mod obstacles;
mod particle;
mod random;

pub use bytemuck;
pub use clock::FixedTimestep;
pub use config::{EmitterConfig, SceneConfig};
pub use emitter::{Emitter, VelocityOrigin};
pub use error::{ConfigError, StepError};
pub use field::{Dynamics, ParticleField, StepReport};
pub use glam::{Mat4, Vec3, Vec4};
pub use obstacles::{ObstacleSet, Sphere, GROUND_HEIGHT};
pub use particle::{MeshHandle, Particle, ParticleInstance};
pub use random::{RandomSource, SequenceSource};

/// Convenient re-exports for common usage.
///
/// ```
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::FixedTimestep;
    pub use crate::config::SceneConfig;
    pub use crate::emitter::{Emitter, VelocityOrigin};
    pub use crate::error::{ConfigError, StepError};
    pub use crate::field::{Dynamics, ParticleField, StepReport};
    pub use crate::obstacles::{ObstacleSet, Sphere};
    pub use crate::particle::{MeshHandle, Particle, ParticleInstance};
    pub use crate::random::RandomSource;
    pub use crate::{Mat4, Vec3, Vec4};
}
