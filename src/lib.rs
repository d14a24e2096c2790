#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A streaming, procedurally generated voxel terrain core built with Rust and WGPU.
//!
//! Terrain is produced in 16x64x16 chunk columns from seeded Perlin noise on a pool of
//! worker threads, face-culled into one mesh per material, and uploaded through a
//! pluggable renderer on the thread that drives the world.
//!
//! ## Key Modules
//!
//! * `engine_state` - The application context and every engine subsystem
//! * `engine_state::voxels` - Blocks, chunks, addressing and the streaming world
//! * `engine_state::rendering` - Meshing, the renderer seam, wgpu and headless backends
//! * `engine_state::task_management` - The blocking queue and the worker pool
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     voxel_world::run();
//! }
//! ```
//!
//! The headless demo walks an observer across the terrain and logs streaming
//! statistics. Set `RUST_LOG=debug` to see per-chunk activity.

use log::{error, info};
use web_time::{Duration, Instant};

use cgmath::Vector3;
use engine_state::{
    config::{self, WorldConfig},
    rendering::headless::{CountingDrawer, HeadlessRenderer},
    EngineState,
};

pub mod engine_state;

/// Environment variable setting the number of demo frames.
pub const DEMO_FRAMES_ENV: &str = "VOXEL_DEMO_FRAMES";

const DEFAULT_DEMO_FRAMES: u64 = 600;
const FRAME_TIME: Duration = Duration::from_millis(16);
/// Observer walking speed in the demo, world units per second.
const DEMO_SPEED: f32 = 12.0;

/// Initialises logging and runs the headless demo.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    if let Err(err) = run_demo() {
        error!("{err}");
    }
}

fn run_demo() -> Result<(), engine_state::error::WorldError> {
    let config = WorldConfig::from_env()?;
    let frames = config::parse_env(DEMO_FRAMES_ENV)?.unwrap_or(DEFAULT_DEMO_FRAMES);

    let mut engine = EngineState::new(config, HeadlessRenderer::new())?;
    engine.set_velocity(Vector3::new(DEMO_SPEED, 0.0, DEMO_SPEED * 0.5));

    let start = Instant::now();
    for _ in 0..frames {
        let frame_start = Instant::now();

        engine.advance(FRAME_TIME);
        let mut drawer = CountingDrawer::default();
        let stats = engine.frame(&mut drawer);

        if engine.frame_count() % 60 == 0 {
            info!(
                "Frame {}: observer {:?}, {} chunks drawn, {} draw calls, {} loaded, {} generating",
                engine.frame_count(),
                engine.observer(),
                stats.chunks_drawn,
                drawer.draw_calls,
                engine.world.loaded_chunk_count(),
                engine.world.generating_count()
            );
        }

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let renderer = engine.world.renderer();
    info!(
        "Demo finished in {:.2?}: {} uploads, {} releases, {} live vertices",
        start.elapsed(),
        renderer.uploads(),
        renderer.releases(),
        renderer.live_vertices()
    );
    engine.shutdown();
    Ok(())
}
