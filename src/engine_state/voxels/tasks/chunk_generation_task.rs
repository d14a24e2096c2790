//! # Chunk Generation Task
//!
//! Produces the voxels and the bucketed mesh of one chunk. Scheduled by the world
//! whenever a chunk enters the load radius, executed on a worker thread.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace};
use web_time::Instant;

use crate::engine_state::{
    generation::terrain::TerrainGenerator,
    rendering::meshing::{cull_faces, ChunkMesh},
    voxels::{
        chunk::ChunkVolume,
        coords::{ChunkCoord, ChunkKey},
    },
};

/// Output of a finished generation task, waiting to be materialised by the world.
#[derive(Debug, Clone)]
pub struct ChunkMeshData {
    /// The chunk this data belongs to
    pub coord: ChunkCoord,
    /// Generated voxels
    pub volume: ChunkVolume,
    /// Face-culled geometry, chunk-local
    pub mesh: ChunkMesh,
}

impl ChunkMeshData {
    /// Packed key of the chunk.
    pub fn key(&self) -> ChunkKey {
        self.coord.key()
    }

    /// World-space minimum corner of the chunk.
    pub fn origin(&self) -> Point3<f32> {
        self.coord.world_origin()
    }
}

/// Generates chunks from a shared, read-only terrain source.
#[derive(Debug, Clone)]
pub struct ChunkGenerationTask {
    generator: Arc<TerrainGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a task backed by `generator`.
    pub fn new(generator: Arc<TerrainGenerator>) -> Self {
        ChunkGenerationTask { generator }
    }

    /// Runs terrain generation and meshing for `coord`.
    pub fn process(&self, coord: ChunkCoord) -> ChunkMeshData {
        let start = Instant::now();

        trace!("Generating terrain for chunk {coord}");
        let volume = self.generator.generate_chunk(coord);

        trace!("Meshing chunk {coord} ({} solid voxels)", volume.solid_count());
        let mesh = cull_faces(&volume);

        trace!("Publishing chunk {coord} ({} faces)", mesh.face_count());
        debug!(
            "Generated chunk {coord} in {:.2?}",
            Instant::now().duration_since(start)
        );

        ChunkMeshData { coord, volume, mesh }
    }
}
