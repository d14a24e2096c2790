//! A renderer that records what it was asked to do instead of touching a GPU.
//!
//! Used by the demo loop and by the world tests to observe uploads, releases and the
//! thread they happen on.

use std::thread::{self, ThreadId};

use cgmath::Point3;

use crate::engine_state::voxels::coords::ChunkCoord;

use super::{ChunkDrawer, ChunkRenderer, MeshMaterial, MeshStream, UploadedMesh};

/// Handle returned by [`HeadlessRenderer::upload`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMesh {
    /// Monotonic upload id
    pub id: u64,
    /// Chunk origin the stream was uploaded at
    pub origin: Point3<f32>,
    /// Number of uploaded vertices
    pub vertex_count: usize,
    /// Number of uploaded indices
    pub index_count: usize,
}

/// Counting [`ChunkRenderer`].
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    uploads: usize,
    releases: usize,
    live_vertices: usize,
    upload_threads: Vec<ThreadId>,
    uploads_per_material: [usize; MeshMaterial::COUNT],
}

impl HeadlessRenderer {
    /// Creates a renderer with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of uploads so far.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Total number of releases so far.
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Uploads not yet released.
    pub fn live_meshes(&self) -> usize {
        self.uploads - self.releases
    }

    /// Vertices held by live meshes.
    pub fn live_vertices(&self) -> usize {
        self.live_vertices
    }

    /// Number of uploads into `material`.
    pub fn uploads_for(&self, material: MeshMaterial) -> usize {
        self.uploads_per_material[material as usize]
    }

    /// Distinct threads that performed an upload.
    pub fn upload_threads(&self) -> &[ThreadId] {
        &self.upload_threads
    }
}

impl ChunkRenderer for HeadlessRenderer {
    type Mesh = HeadlessMesh;

    fn upload(
        &mut self,
        origin: Point3<f32>,
        material: MeshMaterial,
        stream: &MeshStream,
    ) -> HeadlessMesh {
        let current = thread::current().id();
        if !self.upload_threads.contains(&current) {
            self.upload_threads.push(current);
        }

        self.uploads += 1;
        self.uploads_per_material[material as usize] += 1;
        self.live_vertices += stream.vertices.len();
        self.next_id += 1;

        HeadlessMesh {
            id: self.next_id,
            origin,
            vertex_count: stream.vertices.len(),
            index_count: stream.indices.len(),
        }
    }

    fn release(&mut self, mesh: HeadlessMesh) {
        self.releases += 1;
        self.live_vertices -= mesh.vertex_count;
    }
}

/// Drawer that counts chunks and draw calls.
#[derive(Debug, Default)]
pub struct CountingDrawer {
    /// Chunks visited this frame
    pub chunks: usize,
    /// Per-material draw calls this frame
    pub draw_calls: usize,
    /// Indices submitted this frame
    pub indices: usize,
}

impl ChunkDrawer<HeadlessMesh> for CountingDrawer {
    fn draw_chunk(&mut self, _coord: ChunkCoord, meshes: &[UploadedMesh<HeadlessMesh>]) {
        self.chunks += 1;
        self.draw_calls += meshes.len();
        self.indices += meshes
            .iter()
            .map(|uploaded| uploaded.mesh.index_count)
            .sum::<usize>();
    }
}
