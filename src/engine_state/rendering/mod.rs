//! Rendering system for the voxel engine.
//!
//! Meshing runs on worker threads and produces plain vertex/index data. Turning that
//! data into draw-ready resources happens only on the thread that owns the
//! [`ChunkRenderer`], which is the thread driving the world.
//!
//! Two backends are provided:
//! - [`gpu::GpuChunkRenderer`]: uploads to wgpu buffers and draws one call per material
//! - [`headless::HeadlessRenderer`]: keeps counters only, used for the demo loop and tests

use cgmath::Point3;

use crate::engine_state::voxels::coords::ChunkCoord;

pub mod gpu;
pub mod headless;
pub mod meshing;
pub mod texture;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMesh, MeshMaterial, MeshStream};
pub use vertex::Vertex;

/// Turns CPU-side mesh streams into backend resources.
///
/// Implementations are owned by the world and are only ever called from the thread
/// that drives `update`/`render`, so they may hold thread-affine handles.
pub trait ChunkRenderer {
    /// Backend handle for one uploaded material stream.
    type Mesh;

    /// Uploads a non-empty stream whose vertices are relative to `origin`.
    fn upload(&mut self, origin: Point3<f32>, material: MeshMaterial, stream: &MeshStream)
        -> Self::Mesh;

    /// Frees a previously uploaded stream.
    fn release(&mut self, mesh: Self::Mesh);
}

/// One uploaded material bucket of a chunk.
#[derive(Debug)]
pub struct UploadedMesh<M> {
    /// Texture bucket this geometry belongs to
    pub material: MeshMaterial,
    /// Backend handle
    pub mesh: M,
}

/// Receives the draw calls of a frame.
pub trait ChunkDrawer<M> {
    /// Draws every uploaded bucket of the chunk at `coord`.
    fn draw_chunk(&mut self, coord: ChunkCoord, meshes: &[UploadedMesh<M>]);
}

/// Something that owns GPU-side geometry for a [`ChunkRenderer`].
pub trait Renderable<R: ChunkRenderer> {
    /// Replaces any previous upload with the current mesh.
    fn upload_mesh(&mut self, renderer: &mut R);

    /// Issues draw calls. A no-op when nothing is uploaded.
    fn render<D: ChunkDrawer<R::Mesh>>(&self, drawer: &mut D);

    /// Releases every uploaded resource.
    fn cleanup(&mut self, renderer: &mut R);
}
