//! The synthesized reveal pass.
//!
//! A [`DissolveMaterial`] visually approximates one captured original
//! material: it borrows the original's diffuse map (or falls back to its flat
//! base color), keeps its face-culling mode and adds the dither parameters
//! the shader needs. The shader discards fragments whose Bayer threshold
//! exceeds the current progress; see `dissolve_shader.wgsl` and the CPU
//! mirror in [`crate::reveal`].

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::{self, Material, Vertex},
        texture::Texture,
        transform::TransformRaw,
    },
    pipelines::basic::mk_render_pipeline,
    resources::texture::material_layout,
    reveal,
};

/// Uniform data of one dissolve material.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DissolveParams {
    pub base_color: [f32; 4],
    pub progress: f32,
    pub cell_size: f32,
    pub has_map: u32,
    // Uniforms require 16 byte spacing, hence the padding field
    pub _padding: u32,
}

/// Per-mesh reveal material, owned by its node while dissolving.
///
/// The diffuse texture stays owned by the captured original; the bind group
/// only references it. Dropping a settled node's dissolve material therefore
/// never destroys authored resources.
#[derive(Debug)]
pub struct DissolveMaterial {
    params: DissolveParams,
    pub double_sided: bool,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl DissolveMaterial {
    /// Synthesize the reveal pass for one captured material.
    ///
    /// There is no failure path: a material without a map degrades to its
    /// flat base color, which the neutral default material provides when the
    /// original is missing entirely.
    pub fn from_original(
        device: &wgpu::Device,
        original: &Material,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let params = DissolveParams {
            base_color: original.base_color,
            progress: 0.0,
            cell_size: reveal::CELL_SIZE,
            has_map: original.has_map as u32,
            _padding: 0,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Dissolve Params", original.name)),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&original.diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&original.diffuse_texture.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(&format!("{:?} Dissolve Bind Group", original.name)),
        });

        Self {
            params,
            double_sided: original.double_sided,
            buffer,
            bind_group,
        }
    }

    pub fn progress(&self) -> f32 {
        self.params.progress
    }

    /// Push the instance's progress into the uniform buffer.
    pub fn set_progress(&mut self, queue: &wgpu::Queue, progress: f32) {
        self.params.progress = progress;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.params]));
    }
}

pub fn mk_dissolve_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Dissolve Pipeline Layout"),
        bind_group_layouts: &[&material_layout(device), camera_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Dissolve Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("dissolve_shader.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &pipeline_layout,
        config.format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(Texture::DEPTH_FORMAT),
        &[model::ModelVertex::desc(), TransformRaw::desc()],
        shader,
        cull_mode,
    )
}
