//! # Terrain Generation
//!
//! Turns the noise field into column heights and column heights into materials.
//! The generator is the single authority on terrain: workers, spawn logic and tests
//! all ask it, so a column always looks the same no matter who computes it.

use crate::engine_state::voxels::{
    block::VoxelType,
    chunk::{ChunkVolume, CHUNK_HEIGHT, CHUNK_SIZE},
    coords::{ChunkCoord, LocalPos},
};

use super::PerlinNoise;

/// Height every column oscillates around.
pub const BASE_HEIGHT: i32 = 32;
/// Maximum deviation from `BASE_HEIGHT` produced by the noise.
pub const HEIGHT_VARIATION: f64 = 16.0;
/// Columns whose surface lies below this are sand all the way down.
pub const SEA_LEVEL: i32 = 34;
/// Number of dirt layers between the grass and the cobblestone.
pub const DIRT_DEPTH: i32 = 3;

/// World units to noise units.
const TERRAIN_SCALE: f64 = 0.01;
const TERRAIN_OCTAVES: u32 = 4;
const TERRAIN_PERSISTENCE: f64 = 0.5;

/// Deterministic terrain source for one world seed.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    seed: u32,
    noise: PerlinNoise,
}

impl TerrainGenerator {
    /// Creates a generator for `seed`.
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            seed,
            noise: PerlinNoise::new(seed),
        }
    }

    /// The seed this generator was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Surface height of the column at world `(x, z)`, clamped to
    /// `[0, CHUNK_HEIGHT - 1]`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let sample = self.noise.fractal_noise(
            world_x as f64 * TERRAIN_SCALE,
            world_z as f64 * TERRAIN_SCALE,
            TERRAIN_OCTAVES,
            TERRAIN_PERSISTENCE,
            1.0,
        );
        let height = BASE_HEIGHT + (sample * HEIGHT_VARIATION) as i32;
        height.clamp(0, CHUNK_HEIGHT - 1)
    }

    /// Material of voxel `y` in a column whose surface is at `height`.
    pub fn block_type(y: i32, height: i32) -> VoxelType {
        if y > height || y < 0 {
            VoxelType::Air
        } else if height < SEA_LEVEL {
            VoxelType::Sand
        } else if y == height {
            VoxelType::Grass
        } else if y >= height - DIRT_DEPTH {
            VoxelType::Dirt
        } else {
            VoxelType::Cobblestone
        }
    }

    /// Material at an arbitrary world position, as freshly generated.
    pub fn block_type_at(&self, world_x: i32, world_y: i32, world_z: i32) -> VoxelType {
        Self::block_type(world_y, self.height_at(world_x, world_z))
    }

    /// Fills a fresh volume for the chunk at `coord`.
    pub fn generate_chunk(&self, coord: ChunkCoord) -> ChunkVolume {
        let mut volume = ChunkVolume::empty();

        for local_x in 0..CHUNK_SIZE {
            for local_z in 0..CHUNK_SIZE {
                // Exact for chunks inside the world range; wraps outside it.
                let world_x = coord.x.wrapping_mul(CHUNK_SIZE).wrapping_add(local_x);
                let world_z = coord.z.wrapping_mul(CHUNK_SIZE).wrapping_add(local_z);
                let height = self.height_at(world_x, world_z);

                for y in 0..=height {
                    if let Some(pos) = LocalPos::new(local_x, y, local_z) {
                        volume.set(pos, Self::block_type(y, height));
                    }
                }
            }
        }

        volume
    }
}
