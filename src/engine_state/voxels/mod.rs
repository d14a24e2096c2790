//! # Voxel Engine Core
//!
//! Representation and streaming of the voxel world.
//!
//! ## Architecture
//!
//! * **Block**: voxel materials and the six face directions
//! * **Coords**: chunk keys and world/chunk/local conversions
//! * **Chunk**: fixed-size voxel columns with their meshes
//! * **Tasks**: generation work executed on the chunk workers
//! * **World**: loads and unloads chunks around the observer and owns the renderer
//!
//! ## Data Flow
//!
//! 1. `World::update` queues missing coordinates for the workers
//! 2. A worker generates terrain and meshes it
//! 3. The world uploads the finished mesh on its own thread
//! 4. Block edits remesh the owning chunk synchronously

pub mod block;
pub mod chunk;
pub mod coords;
pub mod tasks;
pub mod world;
