//! Mesh generation for voxel rendering.
//!
//! This module converts chunk volumes into GPU-friendly geometry. The key goals are:
//! 1. Never emit a face that another voxel hides
//! 2. Keep one vertex/index stream per texture so each bucket is one draw call
//! 3. Stay free of graphics API calls so it can run on worker threads
//!
//! # Architecture
//! - [`MeshMaterial`]: the render buckets, including the three grass buckets
//! - [`Face`]: one quad on one side of a voxel
//! - [`MeshStream`] / [`ChunkMesh`]: bucketed vertex and index data
//! - [`cull_faces`]: the face-culling pass

mod culling;
mod face;
mod mesh;

pub use culling::cull_faces;
pub use face::Face;
pub use mesh::*;

use crate::engine_state::voxels::block::{BlockSide, VoxelType};

/// A render bucket.
///
/// Grass gets three buckets so its top, sides and bottom can carry distinct
/// textures; every other solid material has exactly one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MeshMaterial {
    /// All faces of dirt voxels
    Dirt = 0,
    /// All faces of cobblestone voxels
    Cobblestone = 1,
    /// All faces of sand voxels
    Sand = 2,
    /// Upward faces of grass voxels
    GrassTop = 3,
    /// The four horizontal-facing faces of grass voxels
    GrassSide = 4,
    /// Downward faces of grass voxels
    GrassBottom = 5,
}

impl MeshMaterial {
    /// Number of buckets.
    pub const COUNT: usize = 6;

    /// Every bucket in discriminant order.
    pub const ALL: [MeshMaterial; MeshMaterial::COUNT] = [
        MeshMaterial::Dirt,
        MeshMaterial::Cobblestone,
        MeshMaterial::Sand,
        MeshMaterial::GrassTop,
        MeshMaterial::GrassSide,
        MeshMaterial::GrassBottom,
    ];

    /// Bucket receiving the `side` face of a `voxel_type` voxel. `None` for air.
    pub fn for_face(voxel_type: VoxelType, side: BlockSide) -> Option<Self> {
        match voxel_type {
            VoxelType::Air => None,
            VoxelType::Dirt => Some(MeshMaterial::Dirt),
            VoxelType::Cobblestone => Some(MeshMaterial::Cobblestone),
            VoxelType::Sand => Some(MeshMaterial::Sand),
            VoxelType::Grass => Some(match side {
                BlockSide::TOP => MeshMaterial::GrassTop,
                BlockSide::BOTTOM => MeshMaterial::GrassBottom,
                _ => MeshMaterial::GrassSide,
            }),
        }
    }

    /// File name of the texture used for this bucket.
    pub fn texture_file(self) -> &'static str {
        match self {
            MeshMaterial::Dirt => "dirt.png",
            MeshMaterial::Cobblestone => "cobblestone.png",
            MeshMaterial::Sand => "sand.png",
            MeshMaterial::GrassTop => "grass_block_top.png",
            MeshMaterial::GrassSide => "grass_block_side.png",
            MeshMaterial::GrassBottom => "dirt.png",
        }
    }
}
