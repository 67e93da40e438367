//! Headless driver for the Verlet particle solver
//!
//! Plays the part of the interactive front end on a fixed frame clock: it
//! owns the container, issues the spawn, impulse, clear and container-move
//! requests a user would, and logs the numbers a HUD would show.

use std::collections::VecDeque;
use std::time::Instant;

use glam::Vec3;
use rand::Rng;
use verlet_physics::{ColorCategory, Container, ParticleInstance, PARTICLE_RADIUS};
use verlet_simulation::{Simulation, SimulationError, SimulationParams};

const TARGET_FPS: f32 = 60.0;
const FRAME_COUNT: u32 = 900;
/// Seeded particles activated per frame while "adding"
const ADDITION_SPEED: usize = 10;
const ADDITION_FRAMES: u32 = 30;
/// Frames between automatic red spawns at the top of the container
const AUTO_SPAWN_INTERVAL: u32 = 60;
/// Chance per frame of a user spawn near the container centre
const USER_SPAWN_CHANCE: f32 = 0.25;
const CONTAINER_NUDGE: f32 = 0.05;
const IMPULSE_CENTER: Vec3 = Vec3::new(0.0, 3.0, 0.0);
const IMPULSE_STRENGTH: f32 = -30.0;
const STATS_INTERVAL: u32 = 60;

/// Scripted user input for one frame
#[derive(Debug, Default)]
struct FrameInput {
    add_seeded: bool,
    user_spawn: Option<ColorCategory>,
    container_nudge: Vec3,
    impulse: bool,
    clear: bool,
}

impl FrameInput {
    fn scripted(frame: u32, rng: &mut impl Rng) -> Self {
        const USER_COLORS: [ColorCategory; 3] =
            [ColorCategory::Green, ColorCategory::Blue, ColorCategory::White];

        let user_spawn = (rng.random::<f32>() < USER_SPAWN_CHANCE)
            .then(|| USER_COLORS[rng.random_range(0..USER_COLORS.len())]);

        let container_nudge = match frame {
            300..=359 => Vec3::X * CONTAINER_NUDGE,
            360..=419 => Vec3::NEG_X * CONTAINER_NUDGE,
            _ => Vec3::ZERO,
        };

        Self {
            add_seeded: frame < ADDITION_FRAMES,
            user_spawn,
            container_nudge,
            impulse: (600..630).contains(&frame),
            clear: frame == 750,
        }
    }
}

fn main() -> Result<(), SimulationError> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting headless Verlet particle run...");

    let params = SimulationParams::default();
    let mut sim = Simulation::new(params)?;
    let mut container = Container::new(Vec3::ZERO, params.container_radius);
    let mut rng = rand::rng();

    let frame_dt = 1.0 / TARGET_FPS;
    let mut instances: Vec<ParticleInstance> = Vec::with_capacity(params.capacity);
    let mut solve_times: VecDeque<f32> = VecDeque::with_capacity(STATS_INTERVAL as usize);

    for frame in 0..FRAME_COUNT {
        let input = FrameInput::scripted(frame, &mut rng);

        if input.add_seeded {
            sim.activate_seeded(ADDITION_SPEED);
        }

        if frame % AUTO_SPAWN_INTERVAL == 0 {
            let top = container.north_pole(PARTICLE_RADIUS);
            sim.spawn(top, Vec3::ZERO, ColorCategory::Red, PARTICLE_RADIUS);
        }
        if let Some(category) = input.user_spawn {
            let jitter = Vec3::new(
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
            );
            sim.spawn(container.center + jitter, Vec3::ZERO, category, PARTICLE_RADIUS);
        }

        container.translate(input.container_nudge);
        if input.impulse {
            sim.apply_impulse(IMPULSE_CENTER, IMPULSE_STRENGTH * params.substeps as f32);
        }
        if input.clear {
            log::info!("Clearing all motion");
        }

        let start = Instant::now();
        sim.step_frame(frame_dt, input.clear, &container);
        if solve_times.len() == STATS_INTERVAL as usize {
            solve_times.pop_front();
        }
        solve_times.push_back(start.elapsed().as_secs_f32());

        // What the renderer would upload this frame
        sim.write_instances(&mut instances);
        let upload: &[u8] = bytemuck::cast_slice(&instances);

        if frame % STATS_INTERVAL == STATS_INTERVAL - 1 {
            let avg_solve = solve_times.iter().sum::<f32>() / solve_times.len() as f32;
            let max_speed = instances.iter().map(|i| i.speed).fold(0.0, f32::max);
            log::info!(
                "frame {:>4} | balls {:>5} | visible {:>5} | solve {:>6.2} ms | max speed {:>6.2} | upload {} bytes | container at {}",
                frame + 1,
                sim.active_count(),
                sim.visible_count(),
                avg_solve * 1000.0,
                max_speed,
                upload.len(),
                container.center
            );
        }
    }

    log::info!("Finished {FRAME_COUNT} frames with {} particles", sim.active_count());
    Ok(())
}
