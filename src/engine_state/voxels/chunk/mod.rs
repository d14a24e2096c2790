//! # Chunk Module
//!
//! A chunk is a 16x64x16 column of voxels together with its current mesh and the
//! backend handles of that mesh once uploaded.
//!
//! ## Lifecycle
//! 1. A worker produces the volume and mesh (see `tasks::chunk_generation_task`)
//! 2. The world wraps them in a [`Chunk`] and calls [`Renderable::upload_mesh`]
//! 3. Edits go through [`Chunk::set_block`], which remeshes on the calling thread
//! 4. On unload the world calls [`Renderable::cleanup`] before dropping the chunk

use cgmath::Point3;
use log::trace;

use crate::engine_state::rendering::{
    meshing::{cull_faces, ChunkMesh},
    ChunkDrawer, ChunkRenderer, Renderable, UploadedMesh,
};

use super::{block::VoxelType, coords::ChunkCoord, coords::LocalPos};

mod volume;

pub use volume::{ChunkVolume, CHUNK_VOLUME};

/// Width and depth of a chunk in voxels.
pub const CHUNK_SIZE: i32 = 16;
/// Height of a chunk (and of the world) in voxels.
pub const CHUNK_HEIGHT: i32 = 64;

/// A loaded chunk. `M` is the backend mesh handle type.
#[derive(Debug)]
pub struct Chunk<M> {
    coord: ChunkCoord,
    volume: ChunkVolume,
    mesh: ChunkMesh,
    uploaded: Vec<UploadedMesh<M>>,
}

impl<M> Chunk<M> {
    /// Wraps generated data. Nothing is uploaded yet.
    pub fn new(coord: ChunkCoord, volume: ChunkVolume, mesh: ChunkMesh) -> Self {
        Chunk {
            coord,
            volume,
            mesh,
            uploaded: Vec::new(),
        }
    }

    /// Chunk coordinate.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// World-space minimum corner.
    pub fn origin(&self) -> Point3<f32> {
        self.coord.world_origin()
    }

    /// Voxel contents.
    pub fn volume(&self) -> &ChunkVolume {
        &self.volume
    }

    /// Current CPU-side mesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Uploaded material buckets.
    pub fn uploaded(&self) -> &[UploadedMesh<M>] {
        &self.uploaded
    }

    /// Whether any bucket is currently uploaded.
    pub fn is_uploaded(&self) -> bool {
        !self.uploaded.is_empty()
    }

    /// Voxel at `pos`.
    pub fn get_block(&self, pos: LocalPos) -> VoxelType {
        self.volume.get(pos)
    }

    /// Writes a voxel and, if it changed, rebuilds and re-uploads the mesh.
    ///
    /// Returns the previous voxel type, or `None` when nothing changed.
    pub fn set_block<R>(
        &mut self,
        pos: LocalPos,
        voxel_type: VoxelType,
        renderer: &mut R,
    ) -> Option<VoxelType>
    where
        R: ChunkRenderer<Mesh = M>,
    {
        let previous = self.volume.set(pos, voxel_type);
        if previous == voxel_type {
            return None;
        }

        trace!("Remeshing chunk {} after edit at {:?}", self.coord, pos);
        self.mesh = cull_faces(&self.volume);
        Renderable::<R>::upload_mesh(self, renderer);
        Some(previous)
    }
}

impl<R: ChunkRenderer> Renderable<R> for Chunk<R::Mesh> {
    fn upload_mesh(&mut self, renderer: &mut R) {
        self.cleanup(renderer);

        let origin = self.origin();
        for (material, stream) in self.mesh.non_empty_streams() {
            let mesh = renderer.upload(origin, material, stream);
            self.uploaded.push(UploadedMesh { material, mesh });
        }
    }

    fn render<D: ChunkDrawer<R::Mesh>>(&self, drawer: &mut D) {
        if self.uploaded.is_empty() {
            return;
        }
        drawer.draw_chunk(self.coord, &self.uploaded);
    }

    fn cleanup(&mut self, renderer: &mut R) {
        for uploaded in self.uploaded.drain(..) {
            renderer.release(uploaded.mesh);
        }
    }
}
