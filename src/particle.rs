//! Particle state and the packed per-instance view handed to renderers.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Opaque handle to a mesh owned by the rendering side.
///
/// The field stores and forwards it with every particle but never looks
/// inside. Its meaning (buffer index, asset id, ...) belongs to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// One simulated particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// World-space velocity (units per second).
    pub velocity: Vec3,
    /// Visual and collision radius. Always positive.
    pub radius: f32,
    /// RGBA color, each channel in `[0, 1]`.
    pub color: Vec4,
    /// Seconds left before the particle is re-emitted. Negative means expired.
    pub lifespan: f32,
    /// Mesh used to draw this particle, if one is configured.
    pub mesh: Option<MeshHandle>,
}

impl Particle {
    /// A particle resting at the origin, as allocated by a resize before its
    /// first emission.
    pub fn dormant(lifespan: f32, radius: f32, mesh: Option<MeshHandle>) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius,
            color: Vec4::ONE,
            lifespan,
            mesh,
        }
    }

    /// Whether the lifespan has run out.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.lifespan < 0.0
    }

    /// Packed representation for instanced drawing.
    #[inline]
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            radius: self.radius,
            color: self.color.to_array(),
        }
    }
}

/// GPU-friendly particle record: 32 bytes, no padding.
///
/// Layout matches a `vec3<f32>` position followed by an `f32` radius and a
/// `vec4<f32>` color, so a slice can be uploaded with
/// [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
}
