//! wgpu backend for chunk meshes.
//!
//! Each non-empty material stream becomes its own vertex and index buffer. The chunk
//! origin is baked into the uploaded vertices so the shader needs only the camera
//! uniform. Each material has a texture bind group at group 1. Materials without an
//! image get a 1x1 white texture.

use cgmath::Point3;
use image::RgbaImage;
use wgpu::{util::DeviceExt, BindGroup, BindGroupLayout, Device, Queue, RenderPass, RenderPipeline};

use crate::engine_state::voxels::coords::ChunkCoord;

use super::{
    texture::TextureSet, ChunkDrawer, ChunkRenderer, MeshMaterial, MeshStream, UploadedMesh,
    Vertex,
};

/// Bind group index of the per-material texture.
pub const MATERIAL_BIND_GROUP_INDEX: u32 = 1;

/// GPU buffers of one material stream.
#[derive(Debug)]
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    /// Number of indices to draw.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Uploads chunk meshes into wgpu buffers.
pub struct GpuChunkRenderer {
    device: Device,
    queue: Queue,
    material_layout: BindGroupLayout,
    material_bind_groups: Vec<BindGroup>,
}

impl GpuChunkRenderer {
    /// Creates the backend and uploads one texture per material.
    pub fn new(device: Device, queue: Queue, textures: &TextureSet) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let fallback = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));

        let material_bind_groups = MeshMaterial::ALL
            .into_iter()
            .map(|material| {
                let image = textures.get(material).unwrap_or(&fallback);
                let texture = device.create_texture_with_data(
                    &queue,
                    &wgpu::TextureDescriptor {
                        label: Some(material.texture_file()),
                        size: wgpu::Extent3d {
                            width: image.width(),
                            height: image.height(),
                            depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: wgpu::TextureFormat::Rgba8UnormSrgb,
                        usage: wgpu::TextureUsages::TEXTURE_BINDING
                            | wgpu::TextureUsages::COPY_DST,
                        view_formats: &[],
                    },
                    wgpu::util::TextureDataOrder::LayerMajor,
                    image.as_raw(),
                );
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &material_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                    label: Some("material_bind_group"),
                })
            })
            .collect();

        Self {
            device,
            queue,
            material_layout,
            material_bind_groups,
        }
    }

    /// Layout of the per-material texture bind group.
    pub fn material_layout(&self) -> &BindGroupLayout {
        &self.material_layout
    }

    /// Builds the chunk pipeline. `camera_layout` is bound at group 0.
    ///
    /// The shader must expose `vs_main` and `fs_main` and read the vertex layout of
    /// [`Vertex::desc`].
    pub fn create_pipeline(
        &self,
        shader_source: &str,
        camera_layout: &BindGroupLayout,
        format: wgpu::TextureFormat,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> RenderPipeline {
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Chunk Render Pipeline Layout"),
                bind_group_layouts: &[camera_layout, &self.material_layout],
                push_constant_ranges: &[],
            });

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Chunk Shader"),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Chunk Render Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
    }

    /// Wraps a render pass so the world can draw into it.
    ///
    /// The caller sets the pipeline and the camera bind group beforehand.
    pub fn pass<'a, 'p>(&'a self, render_pass: &'a mut RenderPass<'p>) -> GpuChunkPass<'a, 'p> {
        GpuChunkPass {
            render_pass,
            material_bind_groups: &self.material_bind_groups,
        }
    }

    /// The queue uploads are written through.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

impl ChunkRenderer for GpuChunkRenderer {
    type Mesh = GpuMesh;

    fn upload(
        &mut self,
        origin: Point3<f32>,
        material: MeshMaterial,
        stream: &MeshStream,
    ) -> GpuMesh {
        let vertices: Vec<Vertex> = stream
            .vertices
            .iter()
            .map(|vertex| vertex.translated(origin))
            .collect();

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(material.texture_file()),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(material.texture_file()),
                contents: bytemuck::cast_slice(&stream.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: stream.indices.len() as u32,
        }
    }

    fn release(&mut self, mesh: GpuMesh) {
        mesh.vertex_buffer.destroy();
        mesh.index_buffer.destroy();
    }
}

/// A render pass borrowed for one frame of chunk drawing.
pub struct GpuChunkPass<'a, 'p> {
    render_pass: &'a mut RenderPass<'p>,
    material_bind_groups: &'a [BindGroup],
}

impl ChunkDrawer<GpuMesh> for GpuChunkPass<'_, '_> {
    fn draw_chunk(&mut self, _coord: ChunkCoord, meshes: &[UploadedMesh<GpuMesh>]) {
        for uploaded in meshes {
            self.render_pass.set_bind_group(
                MATERIAL_BIND_GROUP_INDEX,
                &self.material_bind_groups[uploaded.material as usize],
                &[],
            );
            self.render_pass
                .set_vertex_buffer(0, uploaded.mesh.vertex_buffer.slice(..));
            self.render_pass.set_index_buffer(
                uploaded.mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            self.render_pass
                .draw_indexed(0..uploaded.mesh.index_count, 0, 0..1);
        }
    }
}
