//! The particle field and its per-frame step.
//!
//! A field owns a fixed-length array of particles. Every [`step`] ages each
//! particle, re-emits the expired ones in place, integrates the rest under
//! gravity and resolves them against the collision spheres and the ground.
//!
//! [`step`]: ParticleField::step

use crate::clock::FixedTimestep;
use crate::emitter::Emitter;
use crate::error::{ConfigError, StepError};
use crate::obstacles::{ObstacleSet, Sphere, GROUND_HEIGHT};
use crate::particle::{MeshHandle, Particle, ParticleInstance};
use crate::random::RandomSource;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Tunable constants of the step.
///
/// The defaults reproduce the classic demo tuning and are what the rest of
/// the documentation assumes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dynamics {
    /// Vertical acceleration (units/s²).
    pub gravity: f32,
    /// Fraction of speed kept when bouncing off a sphere.
    pub sphere_restitution: f32,
    /// Multiplier on horizontal velocity at ground contact.
    pub ground_friction: f32,
    /// Multiplier on vertical velocity at ground contact. Negative to bounce.
    pub ground_bounce: f32,
    /// Shortest lifespan given on respawn (seconds).
    pub respawn_lifespan_min: f32,
    /// Respawn lifespans are `min + uniform() * spread`.
    pub respawn_lifespan_spread: f32,
    /// Lifespans after a resize are `uniform() * spread`.
    pub initial_lifespan_spread: f32,
    /// Radius of particles allocated by a resize, before their first emission.
    pub initial_radius: f32,
}

impl Default for Dynamics {
    fn default() -> Self {
        Self {
            gravity: -0.98,
            sphere_restitution: 0.5,
            ground_friction: 0.4,
            ground_bounce: -0.3,
            respawn_lifespan_min: 12.0,
            respawn_lifespan_spread: 19.0,
            initial_lifespan_spread: 20.0,
            initial_radius: 0.5,
        }
    }
}

impl Dynamics {
    /// Check that every constant is finite, that radii and respawn lifespans
    /// stay positive and that lifespan spreads are non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("gravity", self.gravity),
            ("sphere_restitution", self.sphere_restitution),
            ("ground_friction", self.ground_friction),
            ("ground_bounce", self.ground_bounce),
            ("respawn_lifespan_min", self.respawn_lifespan_min),
            ("respawn_lifespan_spread", self.respawn_lifespan_spread),
            ("initial_lifespan_spread", self.initial_lifespan_spread),
            ("initial_radius", self.initial_radius),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidDynamics(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        if self.initial_radius <= 0.0 {
            return Err(ConfigError::InvalidDynamics(format!(
                "initial_radius must be positive, got {}",
                self.initial_radius
            )));
        }
        if self.respawn_lifespan_min <= 0.0 {
            return Err(ConfigError::InvalidDynamics(format!(
                "respawn_lifespan_min must be positive, got {}",
                self.respawn_lifespan_min
            )));
        }
        if self.respawn_lifespan_spread < 0.0 {
            return Err(ConfigError::InvalidDynamics(format!(
                "respawn_lifespan_spread must not be negative, got {}",
                self.respawn_lifespan_spread
            )));
        }
        if self.initial_lifespan_spread < 0.0 {
            return Err(ConfigError::InvalidDynamics(format!(
                "initial_lifespan_spread must not be negative, got {}",
                self.initial_lifespan_spread
            )));
        }
        Ok(())
    }
}

/// What happened during one or more steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles re-emitted because their lifespan ran out.
    pub respawned: usize,
    /// Particles pushed out of a collision sphere.
    pub sphere_contacts: usize,
    /// Particles clamped to the ground plane.
    pub ground_contacts: usize,
}

impl AddAssign for StepReport {
    fn add_assign(&mut self, rhs: Self) {
        self.respawned += rhs.respawned;
        self.sphere_contacts += rhs.sphere_contacts;
        self.ground_contacts += rhs.ground_contacts;
    }
}

/// Fixed-size particle population with emission and collision.
///
/// The field owns its random source; the emitter borrows it for every
/// respawn so the whole simulation draws from one stream.
///
/// # Example
///
/// ```
/// use particle_field::prelude::*;
/// use particle_field::SequenceSource;
///
/// let mut field = ParticleField::new(SequenceSource::constant(0.5))
///     .with_emitter(Emitter::new(1.0, 1.0, Mat4::IDENTITY)?)
///     .with_particle_count(4);
///
/// let report = field.step(0.1).unwrap();
/// assert_eq!(report.respawned, 0);
/// # Ok::<(), ConfigError>(())
/// ```
pub struct ParticleField<R: RandomSource> {
    particles: Vec<Particle>,
    emitter: Emitter,
    obstacles: ObstacleSet,
    mesh: Option<MeshHandle>,
    dynamics: Dynamics,
    rng: R,
}

impl<R: RandomSource> ParticleField<R> {
    /// Create an empty field: no particles, the default emitter, no spheres.
    pub fn new(rng: R) -> Self {
        Self {
            particles: Vec::new(),
            emitter: Emitter::default(),
            obstacles: ObstacleSet::new(),
            mesh: None,
            dynamics: Dynamics::default(),
            rng,
        }
    }

    /// Set the emitter.
    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.set_emitter(emitter);
        self
    }

    /// Set the collision spheres.
    pub fn with_spheres(mut self, spheres: &[Sphere]) -> Result<Self, ConfigError> {
        self.set_collision_spheres(spheres)?;
        Ok(self)
    }

    /// Set the step constants.
    pub fn with_dynamics(mut self, dynamics: Dynamics) -> Result<Self, ConfigError> {
        self.set_dynamics(dynamics)?;
        Ok(self)
    }

    /// Set the particle mesh. Call before [`with_particle_count`] so the new
    /// particles pick it up.
    ///
    /// [`with_particle_count`]: Self::with_particle_count
    pub fn with_particle_mesh(mut self, mesh: MeshHandle) -> Self {
        self.set_particle_mesh(mesh);
        self
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.set_number_of_particles(count);
        self
    }

    // ========== Configuration ==========

    /// Replace the emitter. Particles already in flight are unaffected.
    pub fn set_emitter(&mut self, emitter: Emitter) {
        debug!(
            "Emitter replaced: height {}, radius {}, origin {:?}",
            emitter.height(),
            emitter.radius(),
            emitter.origin()
        );
        self.emitter = emitter;
    }

    /// Store the mesh handle. It is attached to particles allocated by the
    /// next resize; existing particles keep the handle they were created with.
    pub fn set_particle_mesh(&mut self, mesh: MeshHandle) {
        self.mesh = Some(mesh);
    }

    /// Replace all collision spheres.
    ///
    /// On error the previous spheres stay in place.
    pub fn set_collision_spheres(&mut self, spheres: &[Sphere]) -> Result<(), ConfigError> {
        match ObstacleSet::from_spheres(spheres) {
            Ok(obstacles) => {
                self.set_obstacles(obstacles);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected collision spheres: {}", e);
                Err(e)
            }
        }
    }

    /// Replace all collision spheres with an already validated set.
    pub fn set_obstacles(&mut self, obstacles: ObstacleSet) {
        debug!("Collision spheres replaced: {} sphere(s)", obstacles.len());
        self.obstacles = obstacles;
    }

    /// Replace the step constants.
    ///
    /// On error the previous constants stay in place.
    pub fn set_dynamics(&mut self, dynamics: Dynamics) -> Result<(), ConfigError> {
        if let Err(e) = dynamics.validate() {
            warn!("Rejected dynamics: {}", e);
            return Err(e);
        }
        self.dynamics = dynamics;
        Ok(())
    }

    /// Resize the population.
    ///
    /// A different count discards every particle and allocates `count` fresh
    /// ones with staggered lifespans so they do not all respawn together.
    /// The same count leaves the running simulation untouched.
    pub fn set_number_of_particles(&mut self, count: usize) {
        if self.particles.len() == count {
            return;
        }

        debug!("Resizing particle field: {} -> {}", self.particles.len(), count);
        self.particles.clear();
        self.particles.reserve_exact(count);
        for _ in 0..count {
            let lifespan = self.rng.uniform() * self.dynamics.initial_lifespan_spread;
            self.particles
                .push(Particle::dormant(lifespan, self.dynamics.initial_radius, self.mesh));
        }
    }

    // ========== Simulation ==========

    /// Advance the simulation by `dt` seconds.
    ///
    /// A zero `dt` moves nothing but still respawns particles that had
    /// already expired. Negative or non-finite `dt` is rejected and leaves
    /// the field untouched.
    pub fn step(&mut self, dt: f32) -> Result<StepReport, StepError> {
        if !dt.is_finite() || dt < 0.0 {
            warn!("Rejected time step {}", dt);
            return Err(StepError::InvalidTimeStep(dt));
        }

        let dynamics = self.dynamics;
        let mut report = StepReport::default();

        for particle in self.particles.iter_mut() {
            particle.lifespan -= dt;

            if particle.is_expired() {
                let spawned = self.emitter.emit(particle.lifespan, &mut self.rng);
                particle.position = spawned.position;
                particle.velocity = spawned.velocity;
                particle.radius = spawned.radius;
                particle.color = spawned.color;
                particle.lifespan = self.rng.uniform() * dynamics.respawn_lifespan_spread
                    + dynamics.respawn_lifespan_min;
                report.respawned += 1;
                // Newborns neither move nor collide this step.
                continue;
            }

            particle.position += particle.velocity * dt;
            particle.velocity.y += dt * dynamics.gravity;

            if self
                .obstacles
                .collide(&mut particle.position, &mut particle.velocity, dynamics.sphere_restitution)
                .is_some()
            {
                report.sphere_contacts += 1;
            }

            let floor = GROUND_HEIGHT + particle.radius;
            if particle.position.y < floor {
                particle.position.y = floor;
                particle.velocity.x *= dynamics.ground_friction;
                particle.velocity.y *= dynamics.ground_bounce;
                particle.velocity.z *= dynamics.ground_friction;
                report.ground_contacts += 1;
            }
        }

        trace!(
            "Step {:.4}s: {} respawned, {} sphere contacts, {} ground contacts",
            dt,
            report.respawned,
            report.sphere_contacts,
            report.ground_contacts
        );
        Ok(report)
    }

    /// Feed real frame time through a fixed timestep and run the resulting
    /// substeps.
    pub fn advance(&mut self, clock: &mut FixedTimestep, frame_time: f32) -> Result<StepReport, StepError> {
        if !frame_time.is_finite() || frame_time < 0.0 {
            warn!("Rejected frame time {}", frame_time);
            return Err(StepError::InvalidTimeStep(frame_time));
        }

        let substeps = clock.accumulate(frame_time);
        let mut report = StepReport::default();
        for _ in 0..substeps {
            report += self.step(clock.step())?;
        }
        Ok(report)
    }

    // ========== Queries ==========

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to particle state. The population size stays fixed.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    #[inline]
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    #[inline]
    pub fn particle_mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    #[inline]
    pub fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    /// Packed instance data for every particle, in array order.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles.iter().map(Particle::instance).collect()
    }

    /// Like [`instances`](Self::instances) but reuses `out`'s allocation.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.particles.iter().map(Particle::instance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceSource;
    use glam::{Mat4, Vec3};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn seeded(count: usize) -> ParticleField<SmallRng> {
        ParticleField::new(SmallRng::seed_from_u64(1234)).with_particle_count(count)
    }

    #[test]
    fn test_resize_initializes_particles() {
        let field = ParticleField::new(SmallRng::seed_from_u64(5))
            .with_particle_mesh(MeshHandle(7))
            .with_particle_count(100);

        assert_eq!(field.particle_count(), 100);
        for p in field.particles() {
            assert!(p.lifespan >= 0.0 && p.lifespan < 20.0);
            assert_eq!(p.radius, 0.5);
            assert_eq!(p.mesh, Some(MeshHandle(7)));
        }
    }

    #[test]
    fn test_resize_same_count_is_noop() {
        let mut field = seeded(16);
        field.step(0.5).unwrap();
        let before = field.particles().to_vec();

        field.set_number_of_particles(16);
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn test_resize_new_count_reinitializes() {
        let mut field = seeded(4);
        for p in field.particles_mut() {
            p.position = Vec3::splat(9.0);
        }
        field.set_number_of_particles(5);
        assert_eq!(field.particle_count(), 5);
        assert!(field.particles().iter().all(|p| p.position == Vec3::ZERO));
    }

    #[test]
    fn test_mesh_applies_on_next_resize() {
        let mut field = seeded(2);
        field.set_particle_mesh(MeshHandle(1));
        assert!(field.particles().iter().all(|p| p.mesh.is_none()));

        field.set_number_of_particles(3);
        assert!(field.particles().iter().all(|p| p.mesh == Some(MeshHandle(1))));
    }

    #[test]
    fn test_expired_particle_respawns_without_moving() {
        // Every draw is 0.5: respawn lifespan = 0.5 * 19 + 12 = 21.5.
        let mut field = ParticleField::new(SequenceSource::constant(0.5)).with_particle_count(1);
        field.particles_mut()[0].lifespan = -1.0;

        let report = field.step(0.1).unwrap();
        assert_eq!(report.respawned, 1);

        let emitted = Emitter::default().emit(0.0, &mut SequenceSource::constant(0.5));
        let p = field.particles()[0];
        assert_eq!(p.position, emitted.position);
        assert_eq!(p.velocity, emitted.velocity);
        assert_eq!(p.radius, emitted.radius);
        assert_eq!(p.color, emitted.color);
        assert!((p.lifespan - 21.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_dt_still_respawns_expired() {
        let mut field = seeded(1);
        field.particles_mut()[0].lifespan = -0.5;
        let report = field.step(0.0).unwrap();
        assert_eq!(report.respawned, 1);
        assert!(field.particles()[0].lifespan >= 12.0);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut field = seeded(1);
        {
            let p = &mut field.particles_mut()[0];
            p.lifespan = 5.0;
            p.position = Vec3::new(0.0, 4.0, 0.0);
            p.velocity = Vec3::new(1.0, 1.0, 1.0);
        }
        field.step(0.0).unwrap();
        let p = field.particles()[0];
        assert_eq!(p.position, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(p.velocity, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_integration_and_gravity() {
        let mut field = seeded(1);
        {
            let p = &mut field.particles_mut()[0];
            p.lifespan = 5.0;
            p.position = Vec3::new(0.0, 10.0, 0.0);
            p.velocity = Vec3::new(1.0, 0.0, -2.0);
        }
        field.step(0.5).unwrap();
        let p = field.particles()[0];
        assert!((p.position - Vec3::new(0.5, 10.0, -1.0)).length() < 1e-6);
        assert!((p.velocity.y - (-0.49)).abs() < 1e-6);
        assert!((p.lifespan - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_ground_contact_clamps_and_damps() {
        let mut field = seeded(1);
        {
            let p = &mut field.particles_mut()[0];
            p.lifespan = 5.0;
            p.radius = 0.5;
            p.position = Vec3::new(0.0, 0.6, 0.0);
            p.velocity = Vec3::new(1.0, -2.0, 1.0);
        }
        let report = field.step(0.1).unwrap();
        assert_eq!(report.ground_contacts, 1);

        let p = field.particles()[0];
        assert_eq!(p.position.y, 0.5);
        assert!((p.velocity.x - 0.4).abs() < 1e-6);
        assert!((p.velocity.z - 0.4).abs() < 1e-6);
        // -2.0 - 0.098 after gravity, then inverted and damped.
        assert!((p.velocity.y - 2.098 * 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_contact_lands_on_surface() {
        let mut field = seeded(1)
            .with_spheres(&[Sphere::new(Vec3::new(0.0, 5.0, 0.0), 2.0)])
            .unwrap();
        {
            let p = &mut field.particles_mut()[0];
            p.lifespan = 5.0;
            p.position = Vec3::new(1.0, 8.0, 0.0);
            p.velocity = Vec3::new(0.0, -20.0, 0.0);
        }
        let report = field.step(0.1).unwrap();
        assert_eq!(report.sphere_contacts, 1);

        let p = field.particles()[0];
        let distance = (p.position - Vec3::new(0.0, 5.0, 0.0)).length();
        assert!((distance - 2.0).abs() < 1e-5);
        // Redirected outward along the normal.
        assert!(p.velocity.dot(p.position - Vec3::new(0.0, 5.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_rejected_spheres_keep_previous() {
        let mut field = seeded(0)
            .with_spheres(&[Sphere::new(Vec3::ZERO, 1.0)])
            .unwrap();
        let result = field.set_collision_spheres(&[Sphere::new(Vec3::ZERO, -1.0)]);
        assert!(result.is_err());
        assert_eq!(field.obstacles().len(), 1);
    }

    #[test]
    fn test_rejects_negative_dt() {
        let mut field = seeded(3);
        let before = field.particles().to_vec();
        assert_eq!(field.step(-0.1), Err(StepError::InvalidTimeStep(-0.1)));
        assert!(field.step(f32::NAN).is_err());
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn test_set_emitter_replaces_wholesale() {
        let emitter = Emitter::new(3.0, 0.25, Mat4::from_translation(Vec3::Y)).unwrap();
        let field = seeded(0).with_emitter(emitter);
        assert_eq!(field.emitter(), &emitter);
    }

    #[test]
    fn test_custom_dynamics() {
        let dynamics = Dynamics {
            gravity: -9.8,
            ..Dynamics::default()
        };
        let mut field = seeded(1).with_dynamics(dynamics).unwrap();
        {
            let p = &mut field.particles_mut()[0];
            p.lifespan = 5.0;
            p.position = Vec3::new(0.0, 50.0, 0.0);
            p.velocity = Vec3::ZERO;
        }
        field.step(1.0).unwrap();
        assert!((field.particles()[0].velocity.y + 9.8).abs() < 1e-6);
    }

    #[test]
    fn test_default_dynamics_are_valid() {
        assert!(Dynamics::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_dynamics() {
        let rejected = [
            Dynamics { initial_radius: 0.0, ..Dynamics::default() },
            Dynamics { initial_radius: -1.0, ..Dynamics::default() },
            Dynamics { respawn_lifespan_min: -40.0, ..Dynamics::default() },
            Dynamics { respawn_lifespan_min: 0.0, ..Dynamics::default() },
            Dynamics { respawn_lifespan_spread: -1.0, ..Dynamics::default() },
            Dynamics { initial_lifespan_spread: -5.0, ..Dynamics::default() },
            Dynamics { gravity: f32::NAN, ..Dynamics::default() },
            Dynamics { sphere_restitution: f32::INFINITY, ..Dynamics::default() },
            Dynamics { ground_friction: f32::NAN, ..Dynamics::default() },
            Dynamics { ground_bounce: f32::NEG_INFINITY, ..Dynamics::default() },
        ];
        for dynamics in rejected {
            assert!(
                matches!(dynamics.validate(), Err(ConfigError::InvalidDynamics(_))),
                "accepted {:?}",
                dynamics
            );
        }
    }

    #[test]
    fn test_rejected_dynamics_keep_previous() {
        let custom = Dynamics { gravity: -2.0, ..Dynamics::default() };
        let mut field = seeded(0).with_dynamics(custom).unwrap();

        let bad = Dynamics { initial_radius: -1.0, ..Dynamics::default() };
        assert!(field.set_dynamics(bad).is_err());
        assert_eq!(field.dynamics(), &custom);
        assert!(seeded(0).with_dynamics(bad).is_err());
    }

    #[test]
    fn test_advance_runs_substeps() {
        let mut field = seeded(8);
        let mut clock = FixedTimestep::new(0.1);
        field.advance(&mut clock, 0.35).unwrap();
        assert_eq!(clock.steps(), 3);
        assert!(field.advance(&mut clock, -1.0).is_err());
    }

    #[test]
    fn test_write_instances_reuses_buffer() {
        let field = seeded(10);
        let mut out = vec![ParticleInstance::default(); 32];
        field.write_instances(&mut out);
        assert_eq!(out.len(), 10);
        assert_eq!(out, field.instances());
    }
}
