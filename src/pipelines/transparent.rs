use crate::{
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
        transform::TransformRaw,
    },
    pipelines::basic::mk_render_pipeline,
    resources::texture::material_layout,
};

/**
 * Alpha-blended variant of the model pipeline.
 *
 * Used by the placeholder view for its translucent pulsing cube. Culling is
 * disabled so the inside of the cube stays visible through the faces.
 */
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Transparent Pipeline Layout"),
        bind_group_layouts: &[&material_layout(device), camera_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Model Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("model_shader.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), TransformRaw::desc()],
        shader,
        None,
    )
}
