//! Mesh data structures for voxel rendering.
//!
//! A chunk's geometry is split into one [`MeshStream`] per [`MeshMaterial`], so each
//! bucket can be drawn with its own texture.

use crate::engine_state::{
    rendering::Vertex,
    voxels::{block::BlockSide, coords::LocalPos},
};

use super::{face::Face, MeshMaterial};

/// Vertex and index data of one material bucket.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshStream {
    /// The vertex data for this bucket
    pub vertices: Vec<Vertex>,
    /// The index data for this bucket
    pub indices: Vec<u32>,
}

impl MeshStream {
    /// Appends a quad.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&face.vertices());
        self.indices.extend_from_slice(&Face::indices(base));
    }

    /// Number of quads in the stream.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Whether the stream holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether the quad on `side` of the voxel at `pos` is present.
    ///
    /// Linear in the stream length; meant for diagnostics and tests.
    pub fn contains_face(&self, pos: LocalPos, side: BlockSide) -> bool {
        let expected = Face::new(pos, side).vertices();
        self.vertices
            .chunks_exact(4)
            .any(|quad| quad == expected.as_slice())
    }
}

/// Complete geometry of one chunk, bucketed by material.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChunkMesh {
    streams: [MeshStream; MeshMaterial::COUNT],
}

impl ChunkMesh {
    /// Creates a mesh with every bucket empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket for `material`.
    pub fn stream(&self, material: MeshMaterial) -> &MeshStream {
        &self.streams[material as usize]
    }

    /// Mutable access to the bucket for `material`.
    pub fn stream_mut(&mut self, material: MeshMaterial) -> &mut MeshStream {
        &mut self.streams[material as usize]
    }

    /// Iterates every bucket that holds geometry.
    pub fn non_empty_streams(&self) -> impl Iterator<Item = (MeshMaterial, &MeshStream)> {
        MeshMaterial::ALL
            .into_iter()
            .map(move |material| (material, self.stream(material)))
            .filter(|(_, stream)| !stream.is_empty())
    }

    /// Total number of quads across all buckets.
    pub fn face_count(&self) -> usize {
        self.streams.iter().map(MeshStream::face_count).sum()
    }

    /// Total number of vertices across all buckets.
    pub fn vertex_count(&self) -> usize {
        self.streams.iter().map(|s| s.vertices.len()).sum()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.streams.iter().all(MeshStream::is_empty)
    }
}
