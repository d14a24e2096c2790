//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format produced by the mesher and consumed by the
//! GPU backend.

use cgmath::Point3;

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position, chunk-local when produced by the mesher
    pub position: [f32; 3],
    /// Outward face normal
    pub normal: [f32; 3],
    /// UV texture coordinates (0.0-1.0 across one face)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    pub fn new(position: Point3<f32>, normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Vertex {
            position: [position.x, position.y, position.z],
            normal,
            tex_coords,
        }
    }

    /// Returns this vertex moved by `origin`, used to bake a chunk's world offset into
    /// uploaded geometry.
    pub fn translated(mut self, origin: Point3<f32>) -> Self {
        self.position[0] += origin.x;
        self.position[1] += origin.y;
        self.position[2] += origin.z;
        self
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: tex_coords (vec2<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
