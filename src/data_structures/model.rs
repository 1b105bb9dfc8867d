//! Mesh and material definitions plus their GPU resources.
//!
//! A [`Mesh`] is one indexed triangle list on the GPU. A [`Material`] is the
//! authored surface description the viewer restores once a reveal settles:
//! an optional diffuse map (a solid white fallback texture keeps one
//! bind-group layout for every mesh), the glTF base-color factor and the
//! double-sided flag that decides the culling mode of the pipeline variant
//! used to draw it.

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Indexed triangle geometry on the GPU.
///
/// Buffers are internally reference counted, so cloning a mesh into a scene
/// instance shares the geometry instead of duplicating it.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        vertices: &[ModelVertex],
        indices: &[u32],
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
        }
    }
}

/// Per-material uniform data shared with the shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialParams {
    pub base_color: [f32; 4],
    pub has_map: u32,
    // Uniforms require 16 byte spacing, hence the padding field
    pub _padding: [u32; 3],
}

/// An authored surface description with its bind group.
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub has_map: bool,
    pub double_sided: bool,
    pub diffuse_texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        diffuse_texture: Texture,
        base_color: [f32; 4],
        has_map: bool,
        double_sided: bool,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let params = MaterialParams {
            base_color,
            has_map: has_map as u32,
            _padding: [0; 3],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Material Params", name)),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse_texture.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
            label: Some(&format!("{:?} Material Bind Group", name)),
        });

        Self {
            name: name.to_string(),
            base_color,
            has_map,
            double_sided,
            diffuse_texture,
            bind_group,
        }
    }

    /// Fallback for meshes that reference no material at all.
    pub fn neutral(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let white = Texture::create_solid_color([255, 255, 255, 255], device, queue, "neutral");
        Self::new(
            device,
            "neutral",
            white,
            [0.8, 0.8, 0.8, 1.0],
            false,
            false,
            layout,
        )
    }
}

/// Issues the draw calls for one mesh: material at group 0, camera at
/// group 1, geometry in vertex slot 0 and the node transform in slot 1.
pub trait DrawMesh<'a> {
    fn draw_mesh(
        &mut self,
        mesh: &'a Mesh,
        material: &'a wgpu::BindGroup,
        transform: &'a wgpu::Buffer,
        camera_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(
        &mut self,
        mesh: &'b Mesh,
        material: &'b wgpu::BindGroup,
        transform: &'b wgpu::Buffer,
        camera_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_bind_group(0, material, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, transform.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }
}
