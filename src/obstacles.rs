//! Static collision geometry: spheres plus the ground plane.

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Height of the implicit ground plane. A particle touches it once
/// `position.y < radius`.
pub const GROUND_HEIGHT: f32 = 0.0;

/// Direction used when a particle sits exactly on a sphere center.
const FALLBACK_NORMAL: Vec3 = Vec3::Y;

/// A static collision sphere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Ordered set of collision spheres with their squared radii cached.
///
/// The sphere list and the cache are only ever rebuilt together, so they
/// always have the same length and order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObstacleSet {
    spheres: Vec<Sphere>,
    radii_sq: Vec<f32>,
}

impl ObstacleSet {
    /// An empty set (ground plane only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `spheres`, keeping their order.
    ///
    /// Every radius must be finite and positive and every center finite.
    pub fn from_spheres(spheres: &[Sphere]) -> Result<Self, ConfigError> {
        for (index, sphere) in spheres.iter().enumerate() {
            if !sphere.radius.is_finite() || sphere.radius <= 0.0 {
                return Err(ConfigError::InvalidSphere {
                    index,
                    radius: sphere.radius,
                });
            }
            if !sphere.center.is_finite() {
                return Err(ConfigError::NonFiniteSphereCenter { index });
            }
        }

        Ok(Self {
            spheres: spheres.to_vec(),
            radii_sq: spheres.iter().map(|s| s.radius * s.radius).collect(),
        })
    }

    #[inline]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Cached squared radii, index-aligned with [`spheres`](Self::spheres).
    #[inline]
    pub fn squared_radii(&self) -> &[f32] {
        &self.radii_sq
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Index of the first sphere, in set order, whose interior contains
    /// `point`. Points exactly on a surface are outside.
    pub fn first_hit(&self, point: Vec3) -> Option<usize> {
        self.spheres
            .iter()
            .zip(&self.radii_sq)
            .position(|(sphere, &radius_sq)| (point - sphere.center).length_squared() < radius_sq)
    }

    /// Resolve a particle against the first sphere containing it.
    ///
    /// The particle is pushed out to the surface along the center-to-particle
    /// direction and its velocity is replaced by that direction at the
    /// incoming speed times `restitution`. Returns the index of the sphere
    /// that was hit.
    pub fn collide(&self, position: &mut Vec3, velocity: &mut Vec3, restitution: f32) -> Option<usize> {
        let index = self.first_hit(*position)?;
        let sphere = &self.spheres[index];

        let normal = (*position - sphere.center)
            .try_normalize()
            .unwrap_or(FALLBACK_NORMAL);
        *position = sphere.center + normal * sphere.radius;
        *velocity = normal * velocity.length() * restitution;
        Some(index)
    }
}
