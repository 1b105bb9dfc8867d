//! The central GPU/window context.
//!
//! One [`Context`] exists per window. It owns the surface, device, queue,
//! camera resources, depth attachment and the pre-built pipelines; flows
//! borrow it every frame and may reconfigure it during `on_init` via
//! [`crate::view::Out::Configure`].

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{self, CameraResources, CameraUniform, Projection},
    data_structures::texture,
    pipelines::{
        basic::mk_model_pipeline, dissolve::mk_dissolve_pipeline,
        transparent::mk_transparent_pipeline,
    },
};

/// Culled and two-sided variant of one pipeline.
///
/// Meshes pick the variant matching their material's double-sided flag, so
/// the dissolve pass preserves the face-culling mode of the material it
/// replaces.
#[derive(Debug)]
pub struct PipelinePair {
    pub culled: wgpu::RenderPipeline,
    pub two_sided: wgpu::RenderPipeline,
}

#[derive(Debug)]
pub struct Pipelines {
    pub model: PipelinePair,
    pub dissolve: PipelinePair,
    pub transparent: wgpu::RenderPipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonState {
    Left,
    Right,
    None,
}

/// Handles to the GPU for asynchronous resource creation.
///
/// Device and queue are internally reference counted, so cloning them out of
/// the context into a load future is cheap and safe.
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
    pub mouse_pressed: MouseButtonState,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            // Browsers go through the GL backend; everything else gets the
            // platform's primary one (Vulkan, Metal, DX12)
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL exposes a reduced limit set
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        log::info!("Surface");
        let caps = surface.get_capabilities(&adapter);
        // Both shaders write colors assuming an sRGB target; a linear format
        // would render everything too dark
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: caps.present_modes[0],
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = camera::Camera::new(
            (0.0, 0.0, 0.0),
            4.0,
            cgmath::Deg(-90.0),
            cgmath::Deg(-20.0),
        );
        let projection =
            camera::Projection::new(config.width, config.height, cgmath::Deg(50.0), 0.1, 500.0);
        let controller = camera::CameraController::new(0.4, 0.1);

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        // One pipeline per pass and culling mode, built once and reused
        let pipelines = Pipelines {
            model: PipelinePair {
                culled: mk_model_pipeline(
                    &device,
                    &config,
                    &bind_group_layout,
                    Some(wgpu::Face::Back),
                ),
                two_sided: mk_model_pipeline(&device, &config, &bind_group_layout, None),
            },
            dissolve: PipelinePair {
                culled: mk_dissolve_pipeline(
                    &device,
                    &config,
                    &bind_group_layout,
                    Some(wgpu::Face::Back),
                ),
                two_sided: mk_dissolve_pipeline(&device, &config, &bind_group_layout, None),
            },
            transparent: mk_transparent_pipeline(&device, &config, &bind_group_layout),
        };

        let camera = CameraResources {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        };

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            pipelines,
            window,
            depth_texture,
            // Matches the dark backdrop the part viewer UI sits on
            clear_colour: wgpu::Color {
                r: 0.031,
                g: 0.059,
                b: 0.098,
                a: 1.0,
            },
            mouse_pressed: MouseButtonState::None,
        })
    }
}
