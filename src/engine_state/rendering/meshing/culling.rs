//! Face-culling mesher.
//!
//! Every solid voxel contributes one quad per side whose neighbour is air. Chunk
//! edges count as air, so a chunk never depends on its neighbours to be meshed.

use crate::engine_state::voxels::{block::BlockSide, chunk::ChunkVolume};

use super::{face::Face, ChunkMesh, MeshMaterial};

/// Builds the bucketed mesh for `volume`.
pub fn cull_faces(volume: &ChunkVolume) -> ChunkMesh {
    let mut mesh = ChunkMesh::new();

    for (pos, voxel_type) in volume.iter_solid() {
        for side in BlockSide::all() {
            if volume.is_neighbor_solid(pos, side) {
                continue;
            }
            if let Some(material) = MeshMaterial::for_face(voxel_type, side) {
                mesh.stream_mut(material).push_face(&Face::new(pos, side));
            }
        }
    }

    mesh
}
