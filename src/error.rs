//! Error types for particle field configuration and stepping.
//!
//! Configuration is validated when it is handed to the field, so a field that
//! accepted its emitter and spheres never produces NaN particles later on.
//! Per-particle numerical corner cases inside a step are handled locally and
//! never surface here.

use std::io;
use thiserror::Error;

/// Errors raised when configuring a particle field or loading a scene.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A collision sphere has a radius that is zero, negative or not finite.
    #[error("Invalid collision sphere {index}: radius must be finite and positive, got {radius}")]
    InvalidSphere { index: usize, radius: f32 },

    /// A collision sphere center is not finite.
    #[error("Invalid collision sphere {index}: center is not finite")]
    NonFiniteSphereCenter { index: usize },

    /// Emitter parameters are degenerate.
    #[error("Invalid emitter: {0}")]
    InvalidEmitter(String),

    /// Step constants would produce non-positive radii or lifespans, or are
    /// not finite.
    #[error("Invalid dynamics: {0}")]
    InvalidDynamics(String),

    /// Failed to read or write a scene file.
    #[error("Failed to access scene file: {0}")]
    Io(#[from] io::Error),

    /// A scene file is not valid JSON for [`SceneConfig`](crate::SceneConfig).
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by [`ParticleField::step`](crate::ParticleField::step).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StepError {
    /// The elapsed time was negative or not a finite number.
    #[error("Invalid time step {0}: elapsed time must be finite and non-negative")]
    InvalidTimeStep(f32),
}
