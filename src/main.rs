//! Headless driver: runs a scene for a number of frames and logs what
//! happened.
//!
//! Usage: `particle-field [scene.json] [frames]`
//!
//! Set `RUST_LOG=debug` (or `trace` for per-step reports) to see more.

use log::info;
use particle_field::{FixedTimestep, SceneConfig, StepReport};
use std::error::Error;

const FRAME_TIME: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let scene = match args.next() {
        Some(path) => {
            info!("Loading scene from {}", path);
            SceneConfig::load(&path)?
        }
        None => SceneConfig::demo(),
    };
    let frames: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    let mut field = scene.build_seeded()?;
    let mut clock = FixedTimestep::new(FRAME_TIME);
    info!(
        "Simulating {} particles against {} sphere(s) for {} frames",
        field.particle_count(),
        field.obstacles().len(),
        frames
    );

    let mut total = StepReport::default();
    for _ in 0..frames {
        total += field.advance(&mut clock, FRAME_TIME)?;
    }

    let lowest = field
        .particles()
        .iter()
        .map(|p| p.position.y - p.radius)
        .fold(f32::INFINITY, f32::min);
    info!("Simulated {:.2}s in {} steps", clock.elapsed(), clock.steps());
    info!(
        "Respawns: {}, sphere contacts: {}, ground contacts: {}",
        total.respawned, total.sphere_contacts, total.ground_contacts
    );
    info!("Lowest clearance above ground: {:.4}", lowest);
    Ok(())
}
