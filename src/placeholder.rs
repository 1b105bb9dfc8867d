//! The idle view: a faint pulsing cube shown while no model is on screen.

use instant::Duration;
use wgpu::util::DeviceExt;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    context::{Context, InitContext},
    data_structures::{
        model::{MaterialParams, Mesh, ModelVertex},
        texture::Texture,
        transform::Transform,
    },
    render::{MeshDraw, Pass, Render},
    resources::texture::material_layout,
    view::{Out, ViewFlow},
    viewer::ViewerEvent,
};

#[cfg(feature = "integration-tests")]
use crate::view::ImageTestResult;

const PULSE_COLOR: [f32; 3] = [0.25, 0.78, 0.86];

/// Renders a translucent unit cube whose opacity slowly pulses.
///
/// Hides itself once the first model is ready; the [`ViewerEvent::ModelReady`]
/// notification is observed but passed on untouched so the host UI still
/// receives it.
pub struct PlaceholderView {
    mesh: Mesh,
    transform_buffer: wgpu::Buffer,
    params: MaterialParams,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    elapsed: f32,
    visible: bool,
}

impl PlaceholderView {
    pub fn new(gpu: &InitContext) -> Self {
        let mesh = mk_cube_mesh(&gpu.device);
        let transform_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Placeholder Transform Buffer"),
                contents: bytemuck::cast_slice(&[Transform::new().to_raw()]),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let params = MaterialParams {
            base_color: [PULSE_COLOR[0], PULSE_COLOR[1], PULSE_COLOR[2], 0.06],
            has_map: 0,
            _padding: [0; 3],
        };
        let params_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Placeholder Params"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let white = Texture::create_solid_color(
            [255, 255, 255, 255],
            &gpu.device,
            &gpu.queue,
            "placeholder",
        );
        let layout = material_layout(&gpu.device);
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&white.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&white.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
            label: Some("Placeholder Bind Group"),
        });

        Self {
            mesh,
            transform_buffer,
            params,
            params_buffer,
            bind_group,
            elapsed: 0.0,
            visible: true,
        }
    }
}

impl<S> ViewFlow<S, ViewerEvent> for PlaceholderView {
    fn on_init(&mut self, _: &mut Context, _: &mut S) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut S, dt: Duration) -> Out<ViewerEvent> {
        if !self.visible {
            return Out::Empty;
        }
        self.elapsed += dt.as_secs_f32();
        let pulse = 0.85 + (self.elapsed * 1.4).sin() * 0.15;
        self.params.base_color[3] = pulse * 0.06;
        ctx.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[self.params]));
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut S,
        _: &DeviceEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut S,
        _: &WindowEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        _: &mut S,
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        if let ViewerEvent::ModelReady = event {
            self.visible = false;
        }
        Some(event)
    }

    fn on_render(&self) -> Render<'_> {
        if !self.visible {
            return Render::None;
        }
        Render::Draw(MeshDraw {
            mesh: &self.mesh,
            transform: &self.transform_buffer,
            material: &self.bind_group,
            two_sided: true,
            pass: Pass::Transparent,
        })
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut S,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

/// Unit cube with per-face normals, centered on the origin.
fn mk_cube_mesh(device: &wgpu::Device) -> Mesh {
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for position in corners {
            vertices.push(ModelVertex {
                position,
                tex_coords: [0.0, 0.0],
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(device, "placeholder_cube", &vertices, &indices)
}
