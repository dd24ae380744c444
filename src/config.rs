//! Scene configuration.
//!
//! A scene bundles everything a field needs (emitter, spheres, particle
//! count, step constants) in a serde-friendly form that can be stored as JSON
//! and turned into a running [`ParticleField`].

use crate::emitter::{Emitter, VelocityOrigin};
use crate::error::ConfigError;
use crate::field::{Dynamics, ParticleField};
use crate::obstacles::Sphere;
use crate::particle::MeshHandle;
use crate::random::RandomSource;
use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serializable emitter parameters. Validated by [`EmitterConfig::build`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub height: f32,
    pub radius: f32,
    /// Column-major local-to-world transformation.
    pub transformation: Mat4,
    pub velocity_origin: VelocityOrigin,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::from(&Emitter::default())
    }
}

impl EmitterConfig {
    pub fn build(&self) -> Result<Emitter, ConfigError> {
        Ok(Emitter::new(self.height, self.radius, self.transformation)?
            .with_velocity_origin(self.velocity_origin))
    }
}

impl From<&Emitter> for EmitterConfig {
    fn from(emitter: &Emitter) -> Self {
        Self {
            height: emitter.height(),
            radius: emitter.radius(),
            transformation: emitter.transformation(),
            velocity_origin: emitter.velocity_origin(),
        }
    }
}

/// A complete particle scene.
///
/// Missing JSON fields fall back to their defaults, so a scene file only
/// needs to state what it changes:
///
/// ```
/// use particle_field::SceneConfig;
///
/// let scene = SceneConfig::from_json(r#"{ "particle_count": 64 }"#).unwrap();
/// assert_eq!(scene.particle_count, 64);
/// assert!(scene.spheres.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particle_count: usize,
    pub emitter: EmitterConfig,
    pub spheres: Vec<Sphere>,
    pub dynamics: Dynamics,
    /// Mesh handle attached to every particle.
    pub mesh: Option<u32>,
    /// Seed for [`build_seeded`](Self::build_seeded). Entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 1_000,
            emitter: EmitterConfig::default(),
            spheres: Vec::new(),
            dynamics: Dynamics::default(),
            mesh: None,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Fountain in the middle of a handful of resting spheres.
    pub fn demo() -> Self {
        Self {
            particle_count: 2_000,
            emitter: EmitterConfig {
                height: 2.0,
                radius: 1.0,
                transformation: Mat4::IDENTITY,
                velocity_origin: VelocityOrigin::World,
            },
            spheres: vec![
                Sphere::new(Vec3::new(-6.0, 2.0, 4.0), 2.0),
                Sphere::new(Vec3::new(5.0, 1.5, 5.0), 1.5),
                Sphere::new(Vec3::new(0.0, 1.0, -6.0), 2.5),
                Sphere::new(Vec3::new(7.0, 3.0, -3.0), 3.0),
                Sphere::new(Vec3::new(-5.0, 1.0, -4.0), 1.0),
            ],
            dynamics: Dynamics::default(),
            mesh: Some(0),
            seed: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a scene from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save the scene as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Validate the scene and build a field drawing from `rng`.
    pub fn build<R: RandomSource>(&self, rng: R) -> Result<ParticleField<R>, ConfigError> {
        let emitter = self.emitter.build()?;
        let mut field = ParticleField::new(rng)
            .with_dynamics(self.dynamics)?
            .with_emitter(emitter)
            .with_spheres(&self.spheres)?;
        if let Some(mesh) = self.mesh {
            field.set_particle_mesh(MeshHandle(mesh));
        }
        field.set_number_of_particles(self.particle_count);
        Ok(field)
    }

    /// Build with a [`SmallRng`] seeded from [`seed`](Self::seed), or from
    /// OS entropy when no seed is set.
    pub fn build_seeded(&self) -> Result<ParticleField<SmallRng>, ConfigError> {
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        self.build(rng)
    }
}
