//! # Voxel Task System
//!
//! Work that runs on the chunk workers. Everything here is free of graphics calls;
//! the results are handed back to the world, which uploads them on its own thread.

pub mod chunk_generation_task;

pub use chunk_generation_task::{ChunkGenerationTask, ChunkMeshData};
