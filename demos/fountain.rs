//! # Fountain
//!
//! A tilted emitter spraying particles onto a single sphere. Prints a coarse
//! height histogram every simulated second so the fountain can be watched in
//! a terminal.
//!
//! Run with: `cargo run --example fountain`

use particle_field::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let emitter = Emitter::new(0.5, 0.75, Mat4::from_rotation_z(0.3))?;
    let mut field = ParticleField::new(SmallRng::seed_from_u64(2024))
        .with_emitter(emitter)
        .with_spheres(&[Sphere::new(Vec3::new(-2.0, 1.0, 0.5), 1.0)])?
        .with_particle_mesh(MeshHandle(0))
        .with_particle_count(500);

    let mut clock = FixedTimestep::new(1.0 / 60.0);
    for second in 0..10 {
        let mut report = StepReport::default();
        for _ in 0..60 {
            report += field.advance(&mut clock, 1.0 / 60.0)?;
        }

        let mut buckets = [0usize; 8];
        for p in field.particles() {
            let bucket = (p.position.y.max(0.0) as usize).min(buckets.len() - 1);
            buckets[bucket] += 1;
        }

        println!(
            "t={:>2}s  respawned {:>3}  sphere {:>4}  ground {:>5}",
            second + 1,
            report.respawned,
            report.sphere_contacts,
            report.ground_contacts
        );
        for (height, count) in buckets.iter().enumerate().rev() {
            println!("  y~{height}  {}", "#".repeat(count / 10));
        }
    }
    Ok(())
}
