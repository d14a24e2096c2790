//! # Engine State Module
//!
//! The core engine module that ties the voxel world to an observer and a frame loop.
//!
//! ## Key Components
//!
//! * `EngineState` - The explicitly constructed application context
//! * `config` - World construction parameters
//! * `generation` - Seeded noise and terrain rules
//! * `rendering` - Meshing, the renderer seam and its backends
//! * `task_management` - The blocking queue and the worker pool
//! * `voxels` - Blocks, chunks, addressing and the streaming world
//!
//! ## Frame Loop
//!
//! ```rust,ignore
//! let mut engine = EngineState::new(config, HeadlessRenderer::new())?;
//! loop {
//!     engine.advance(frame_time);
//!     let stats = engine.frame(&mut drawer);
//! }
//! ```

use cgmath::{Point3, Vector3};
use log::info;
use web_time::Duration;

use rendering::{ChunkDrawer, ChunkRenderer};
use voxels::world::{UpdateSummary, World};

pub mod config;
pub mod error;
pub mod generation;
pub mod rendering;
pub mod task_management;
pub mod voxels;

use config::WorldConfig;
use error::WorldError;

/// Height above the terrain surface the observer spawns at.
const SPAWN_CLEARANCE: f32 = 2.0;

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Streaming work done by the world this frame
    pub update: UpdateSummary,
    /// Chunks handed to the drawer
    pub chunks_drawn: usize,
}

/// Application context: the world, the observer and the frame counter.
///
/// Constructed once and passed by reference; there is no global state.
pub struct EngineState<R: ChunkRenderer> {
    /// The streaming voxel world
    pub world: World<R>,
    observer: Point3<f32>,
    velocity: Vector3<f32>,
    frame: u64,
}

impl<R: ChunkRenderer> EngineState<R> {
    /// Creates the world and places the observer above the terrain at the origin.
    pub fn new(config: WorldConfig, renderer: R) -> Result<Self, WorldError> {
        let world = World::new(config, renderer)?;
        let spawn_height = world.get_terrain_height(0, 0) as f32 + SPAWN_CLEARANCE;
        let observer = Point3::new(0.5, spawn_height, 0.5);
        info!("Observer spawned at {:?}", observer);

        Ok(EngineState {
            world,
            observer,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            frame: 0,
        })
    }

    /// Current observer position.
    pub fn observer(&self) -> Point3<f32> {
        self.observer
    }

    /// Moves the observer to `position`, keeping it above the terrain.
    pub fn teleport(&mut self, position: Point3<f32>) {
        let ground = self
            .world
            .get_terrain_height(position.x.floor() as i32, position.z.floor() as i32)
            as f32;
        self.observer = Point3::new(
            position.x,
            position.y.max(ground + SPAWN_CLEARANCE),
            position.z,
        );
    }

    /// Sets the observer velocity in world units per second.
    pub fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.velocity = velocity;
    }

    /// Integrates the observer position over `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.observer + self.velocity * elapsed.as_secs_f32();
        self.teleport(target);
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Runs one frame: stream around the observer, then draw.
    pub fn frame<D: ChunkDrawer<R::Mesh>>(&mut self, drawer: &mut D) -> FrameStats {
        self.frame += 1;
        let update = self.world.update(self.observer);
        let chunks_drawn = self.world.render(drawer);
        FrameStats {
            update,
            chunks_drawn,
        }
    }

    /// Stops the world's workers and releases every mesh.
    pub fn shutdown(&mut self) {
        self.world.shutdown();
        info!("Engine stopped after {} frames", self.frame);
    }
}
