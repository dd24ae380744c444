//! Cone/disc spawn volume.
//!
//! The emitter samples a point inside a disc of `radius` lifted by up to
//! `height` along the local Y axis, then maps it to world space with its
//! transformation. Particles fly away from the origin at a speed proportional
//! to their distance from it.
//!
//! # Sampling quirks
//!
//! Two behaviors are kept on purpose because scenes are tuned against them:
//!
//! - The disc angle is the raw uniform sample in `[0, 1)` fed straight to
//!   `sin`/`cos`, so spawns cover roughly a 57° wedge of the disc, not the
//!   full circle.
//! - Velocity is derived from the absolute world position. That is only
//!   radial from the emitter when the emitter sits at the world origin. Use
//!   [`VelocityOrigin::Emitter`] for emitters translated elsewhere.
//!
//! # Example
//!
//! ```
//! use particle_field::{Emitter, Mat4, SequenceSource, Vec3};
//!
//! let emitter = Emitter::new(2.0, 0.5, Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))).unwrap();
//! let mut rng = SequenceSource::constant(0.5);
//! let particle = emitter.emit(0.0, &mut rng);
//! assert!(particle.position.y >= 1.0);
//! ```

use crate::error::ConfigError;
use crate::particle::Particle;
use crate::random::RandomSource;
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Speed factor applied to the spawn offset when deriving velocity.
const LAUNCH_SPEED: f32 = 4.0;
/// Smallest emitted radius.
const MIN_RADIUS: f32 = 0.3;
/// Width of the emitted radius range.
const RADIUS_SPREAD: f32 = 0.6;

/// Point that emitted velocities radiate from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityOrigin {
    /// Velocity is the absolute world position scaled by the angle sample.
    #[default]
    World,
    /// Velocity is the offset from the transformed emitter origin.
    Emitter,
}

/// Spawn volume configuration.
///
/// Construct with [`Emitter::new`], which rejects degenerate volumes and
/// transformations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emitter {
    height: f32,
    radius: f32,
    transformation: Mat4,
    velocity_origin: VelocityOrigin,
}

impl Emitter {
    /// Create an emitter.
    ///
    /// * `height` - extent of the spawn volume along local +Y
    /// * `radius` - radius of the spawn disc in the local XZ plane
    /// * `transformation` - affine local-to-world transform
    pub fn new(height: f32, radius: f32, transformation: Mat4) -> Result<Self, ConfigError> {
        let emitter = Self {
            height,
            radius,
            transformation,
            velocity_origin: VelocityOrigin::World,
        };
        emitter.validate()?;
        Ok(emitter)
    }

    /// Choose where emitted velocities radiate from.
    pub fn with_velocity_origin(mut self, origin: VelocityOrigin) -> Self {
        self.velocity_origin = origin;
        self
    }

    /// Spawn volume height.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Spawn disc radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Local-to-world transformation.
    #[inline]
    pub fn transformation(&self) -> Mat4 {
        self.transformation
    }

    #[inline]
    pub fn velocity_origin(&self) -> VelocityOrigin {
        self.velocity_origin
    }

    /// World-space position of the emitter's local origin.
    pub fn origin(&self) -> Vec3 {
        self.transformation.transform_point3(Vec3::ZERO)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ConfigError::InvalidEmitter(format!(
                "height must be finite and positive, got {}",
                self.height
            )));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidEmitter(format!(
                "radius must be finite and positive, got {}",
                self.radius
            )));
        }
        if !self.transformation.is_finite() {
            return Err(ConfigError::InvalidEmitter(
                "transformation contains non-finite values".into(),
            ));
        }
        if self.transformation.determinant() == 0.0 || !self.transformation.inverse().is_finite() {
            return Err(ConfigError::InvalidEmitter(
                "transformation is not invertible".into(),
            ));
        }
        Ok(())
    }

    /// Produce a freshly emitted particle.
    ///
    /// `_seed` is the expired particle's leftover lifespan. It does not
    /// influence sampling. The returned particle has a zero lifespan and no
    /// mesh; the field fills both in.
    ///
    /// Draw order from `rng`: angle, height, disc radius, particle radius,
    /// then red, green and blue.
    pub fn emit<R: RandomSource + ?Sized>(&self, _seed: f32, rng: &mut R) -> Particle {
        let rand_val = rng.uniform();
        let u = rng.uniform() * self.height;
        let r = rng.uniform() * self.radius;

        let local = Vec4::new(r * rand_val.sin(), u, r * rand_val.cos(), 1.0);
        let position = (self.transformation * local).truncate();

        let launch_from = match self.velocity_origin {
            VelocityOrigin::World => Vec3::ZERO,
            VelocityOrigin::Emitter => self.origin(),
        };
        let velocity = (position - launch_from) * rand_val * LAUNCH_SPEED;

        let radius = MIN_RADIUS + rng.uniform() * RADIUS_SPREAD;
        let color = Vec4::new(rng.uniform(), rng.uniform(), rng.uniform(), 1.0);

        Particle {
            position,
            velocity,
            radius,
            color,
            lifespan: 0.0,
            mesh: None,
        }
    }
}

impl Default for Emitter {
    /// Unit cone at the world origin.
    fn default() -> Self {
        Self {
            height: 1.0,
            radius: 1.0,
            transformation: Mat4::IDENTITY,
            velocity_origin: VelocityOrigin::World,
        }
    }
}
