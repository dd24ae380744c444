//! Property tests for the step invariants.

use particle_field::{ParticleField, SceneConfig, Sphere, Vec3};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn demo_field(seed: u64, count: usize) -> ParticleField<SmallRng> {
    SceneConfig {
        particle_count: count,
        ..SceneConfig::demo()
    }
    .build(SmallRng::seed_from_u64(seed))
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn lifespan_decreases_or_resets(seed in any::<u64>(), dt in 0.0f32..0.5) {
        let mut field = demo_field(seed, 64);
        for _ in 0..40 {
            let before: Vec<f32> = field.particles().iter().map(|p| p.lifespan).collect();
            field.step(dt).unwrap();
            for (old, p) in before.iter().zip(field.particles()) {
                let aged = old - dt;
                if aged < 0.0 {
                    prop_assert!(p.lifespan >= 12.0 && p.lifespan < 31.0);
                } else {
                    prop_assert_eq!(p.lifespan, aged);
                }
            }
        }
    }

    #[test]
    fn live_particles_stay_above_ground(seed in any::<u64>(), dt in 0.001f32..0.2) {
        let mut field = demo_field(seed, 64);
        for _ in 0..60 {
            let before: Vec<f32> = field.particles().iter().map(|p| p.lifespan).collect();
            field.step(dt).unwrap();
            for (old, p) in before.iter().zip(field.particles()) {
                if old - dt >= 0.0 {
                    prop_assert!(p.position.y >= p.radius);
                }
            }
        }
    }

    #[test]
    fn sphere_contact_lands_on_surface(
        offset in prop::array::uniform3(-0.99f32..0.99),
        velocity in prop::array::uniform3(-10.0f32..10.0),
        radius in 0.5f32..5.0,
    ) {
        let center = Vec3::new(0.0, 20.0, 0.0);
        let mut field = ParticleField::new(SmallRng::seed_from_u64(0))
            .with_spheres(&[Sphere::new(center, radius)])
            .unwrap()
            .with_particle_count(1);
        {
            let p = &mut field.particles_mut()[0];
            p.lifespan = 10.0;
            p.position = center + Vec3::from(offset) * radius * 0.5;
            p.velocity = Vec3::from(velocity);
        }

        let report = field.step(0.001).unwrap();
        prop_assert_eq!(report.sphere_contacts, 1);

        let p = field.particles()[0];
        let distance = (p.position - center).length();
        prop_assert!((distance - radius).abs() < 1e-4 * radius.max(1.0));
        prop_assert!(p.position.is_finite() && p.velocity.is_finite());
    }

    #[test]
    fn resize_to_same_count_is_idempotent(seed in any::<u64>(), count in 0usize..128, steps in 0usize..20) {
        let mut field = demo_field(seed, count);
        for _ in 0..steps {
            field.step(0.1).unwrap();
        }
        let snapshot = field.particles().to_vec();
        field.set_number_of_particles(count);
        prop_assert_eq!(field.particles(), &snapshot[..]);
    }
}
