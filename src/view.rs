//! View flows and the application event loop.
//!
//! A "view flow" is one self-contained piece of the viewer: the model view
//! with its dissolve reveal, the pulsing placeholder, a host-UI stand-in.
//! Flows receive input events, advance their state once per frame and hand
//! back renderable objects; the loop owns the window, the GPU context and the
//! camera and composes all flows into a single render pass per frame.
//!
//! # User-facing types
//!
//! - [`ViewFlow<S, E>`] is the trait a view implements
//! - [`Out<E>`] carries futures and context configuration out of a flow hook
//!
//! # Frame order
//!
//! 1. winit input events are forwarded to every flow
//! 2. `on_render()` collects each flow's draws, batched per pipeline
//! 3. the frame is drawn and presented
//! 4. the camera uniform is refreshed
//! 5. `on_update(dt)` runs with the elapsed frame time

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

#[cfg(feature = "integration-tests")]
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext, MouseButtonState},
    data_structures::{model::DrawMesh, texture::Texture},
    render::{PassBatches, Render},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// What a flow hook hands back to the loop.
///
/// `FutEvent` wraps futures that resolve to custom events; the loop resolves
/// them on the platform's async runtime and feeds the results back through
/// the event queue, where they stay inert until some flow consumes them.
/// Template loads are the one suspending operation in the viewer and travel
/// exclusively through this variant.
///
/// `Configure` mutates the [`Context`] once, e.g. to reposition the camera or
/// change the clear colour.
///
/// `Empty` means the hook has nothing for the loop to do.
pub enum Out<E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(feature = "integration-tests")]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// A renderable view driven by the event loop.
///
/// Implementations manage their own state; the loop calls the hooks below in
/// a fixed order and never inspects what a flow does in them.
///
/// # Hooks
///
/// 1. `on_init()` runs once after construction; the only place that may reconfigure the context
/// 2. `on_window_events()` / `on_device_events()` run per winit input event
/// 3. `on_update()` runs every frame with the elapsed time
/// 4. `on_custom_events()` receives resolved custom events
/// 5. `on_render()` hands the flow's draws to the frame being built
pub trait ViewFlow<S, E> {
    /// One-time setup; camera start position, clear colour and other context
    /// configuration belong here and nowhere else.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<E>;

    /// Per-frame state update with the elapsed time `dt`.
    ///
    /// The reveal progress advances here, as does any other animation.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<E>;

    /// Raw device input (relative mouse motion and the like).
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out<E>;

    /// Window-scoped input: keyboard, pointer, resize.
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<E>;

    /// A custom event arriving from the queue.
    ///
    /// Return the event to let it travel on to the next flow; return `None`
    /// to consume it.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// The flow's draws for the current frame.
    ///
    /// The loop merges every flow's [`Render`] into per-pipeline batches, so
    /// returning many small draws is fine.
    fn on_render(&self) -> Render<'_>;

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut S,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error>;
}

// Dummy impl to make wasm work
impl<State, Event> Debug for dyn ViewFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ViewFlow")
    }
}

/// Factory producing a boxed flow from the GPU handles.
///
/// Construction is async so a flow can load resources before its first frame.
pub type FlowConstructor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn ViewFlow<S, E>>>>>>;

/// Everything the loop owns per window: GPU context, the shared flow state
/// and whether the surface has been configured yet.
#[derive(Debug)]
pub struct HostState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    surface_ready: bool,
}
impl<'a, State: Default> HostState<State> {
    async fn new(window: Arc<Window>) -> Self {
        let ctx = match Context::new(window).await {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "App initialization failed. Cannot create the main context: {}",
                e
            ),
        };
        Self {
            ctx,
            state: State::default(),
            surface_ready: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.surface_ready = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    #[cfg(feature = "integration-tests")]
    fn mk_capture_texture(&self, extent: wgpu::Extent3d, depth: bool) -> wgpu::Texture {
        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Render Test Capture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: if depth {
                wgpu::TextureFormat::Depth32Float
            } else {
                self.ctx.config.format
            },
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    #[cfg(feature = "integration-tests")]
    fn capture_dims(&self) -> (u32, u32) {
        // Texture-to-buffer copies need rows padded to 256 bytes, so round up
        let width = self.ctx.config.width;
        let height = self.ctx.config.height;
        (
            width + (256 - width % 256),
            height + (256 - height % 256),
        )
    }

    #[cfg(feature = "integration-tests")]
    fn capture_extent(&self) -> wgpu::Extent3d {
        let (width, height) = self.capture_dims();
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        }
    }

    fn render<Event>(
        &'a mut self,
        flows: &mut Vec<Box<dyn ViewFlow<State, Event>>>,
        #[cfg(feature = "integration-tests")] async_runtime: &Runtime,
        #[cfg(feature = "integration-tests")] event_loop: &winit::event_loop::EventLoopProxy<
            HostEvent<State, Event>,
        >,
    ) -> Result<(), wgpu::SurfaceError> {
        // Keep the redraw cycle going
        self.ctx.window.request_redraw();

        // Nothing to draw into until the first resize configured the surface
        if !self.surface_ready {
            return Ok(());
        }

        let frame = self.ctx.surface.get_current_texture()?;
        #[cfg(not(feature = "integration-tests"))]
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        #[cfg(feature = "integration-tests")]
        let (capture, capture_depth) = {
            let extent = self.capture_extent();
            (
                self.mk_capture_texture(extent, false),
                self.mk_capture_texture(extent, true),
            )
        };

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut rpass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        #[cfg(feature = "integration-tests")]
                        view: &capture.create_view(&wgpu::TextureViewDescriptor::default()),
                        #[cfg(not(feature = "integration-tests"))]
                        view: &target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        #[cfg(feature = "integration-tests")]
                        view: &capture_depth.create_view(&wgpu::TextureViewDescriptor::default()),
                        #[cfg(not(feature = "integration-tests"))]
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            // Every flow contributes draws into the shared batches, then each
            // pipeline is set exactly once; the alpha-blended pass goes last.
            let mut batches = PassBatches::default();
            flows.iter_mut().for_each(|flow| {
                flow.on_render().collect_into(&mut batches);
            });

            let passes = [
                (&self.ctx.pipelines.model.culled, batches.model),
                (&self.ctx.pipelines.model.two_sided, batches.model_two_sided),
                (&self.ctx.pipelines.dissolve.culled, batches.dissolve),
                (
                    &self.ctx.pipelines.dissolve.two_sided,
                    batches.dissolve_two_sided,
                ),
                (&self.ctx.pipelines.transparent, batches.transparent),
            ];
            for (pipeline, draws) in passes {
                if draws.is_empty() {
                    continue;
                }
                rpass.set_pipeline(pipeline);
                for draw in draws {
                    if draw.mesh.num_elements == 0 {
                        log::warn!("you attempted to render a mesh with zero indices");
                        continue;
                    }
                    rpass.draw_mesh(
                        draw.mesh,
                        draw.material,
                        draw.transform,
                        &self.ctx.camera.bind_group,
                    );
                }
            }
        }

        #[cfg(feature = "integration-tests")]
        let readback = {
            let pixel_bytes = std::mem::size_of::<u32>() as u32;
            let (width, height) = self.capture_dims();
            let readback = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                size: (pixel_bytes * width * height) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                label: None,
                mapped_at_creation: false,
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &capture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &readback,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(pixel_bytes * width),
                        rows_per_image: Some(height),
                    },
                },
                self.capture_extent(),
            );
            readback
        };

        self.ctx.queue.submit(iter::once(encoder.finish()));

        #[cfg(feature = "integration-tests")]
        let fut_img = async {
            let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
            let slice = readback.slice(..);
            slice.map_async(wgpu::MapMode::Read, move |result| {
                tx.send(result).unwrap();
            });
            self.ctx
                .device
                .poll(wgpu::PollType::Wait {
                    submission_index: None,
                    timeout: Some(Duration::from_secs(3)),
                })
                .unwrap();
            rx.receive().await.unwrap().unwrap();
            let data = slice.get_mapped_range();
            let (width, height) = self.capture_dims();
            image::ImageBuffer::<image::Rgba<u8>, _>::from_raw(width, height, data).unwrap()
        };
        #[cfg(feature = "integration-tests")]
        {
            use std::convert::identity;

            let mut img: image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView> =
                async_runtime.block_on(fut_img);
            let state = &mut self.state;
            let all_passed = flows
                .iter_mut()
                .map(|flow| flow.render_to_texture(&self.ctx, state, &mut img))
                .map(|res| match res {
                    Err(e) => panic!("{}", e),
                    Ok(ImageTestResult::Passed) => true,
                    Ok(ImageTestResult::Failed) => panic!("Assertion failed"),
                    Ok(ImageTestResult::Waiting) => false,
                })
                .all(identity);
            if all_passed {
                event_loop
                    .send_event(HostEvent::Exit)
                    .expect("All assertions passed but the winit event-loop could not safely exit")
            }
        }

        frame.present();
        Ok(())
    }
}

pub struct Host<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<HostEvent<State, Event>>,
    state: Option<HostState<State>>,
    // Fully constructed flows live here once their constructors resolve.
    flows: Vec<Box<dyn ViewFlow<State, Event>>>,
    // Taken out with `Option::take` on the first resume.
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    last_frame: Instant,
}

impl<'a, State, Event> Host<State, Event>
where
    State: 'static,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<HostEvent<State, Event>>,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            flows: Vec::new(),
            constructors: Some(constructors),
            last_frame: Instant::now(),
        }
    }
}

pub(crate) enum HostEvent<State: 'static, Event: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: HostState<State>,
        flows: Vec<Box<dyn ViewFlow<State, Event>>>,
    },
    #[allow(dead_code)]
    Custom(Event),
    #[allow(dead_code)]
    Exit,
}
impl<State, Event> Debug for HostEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Custom(_) => f.write_str("Custom(E)"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl<State: 'static + Default, Event: 'static> ApplicationHandler<HostEvent<State, Event>>
    for Host<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        let constructors = self.constructors.take().unwrap();

        let init_future = async move {
            let host_state = HostState::new(window).await;

            // Passing the context by reference clones only the internal Arcs
            // of device and queue into each constructor
            let pending: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor((&host_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(pending).await;
            (host_state, flows)
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let (mut host_state, flows) = self.async_runtime.block_on(init_future);
            self.flows = flows;
            self.flows.iter_mut().for_each(|flow| {
                let out = flow.on_init(&mut host_state.ctx, &mut host_state.state);
                let proxy = self.proxy.clone();
                dispatch_out(&self.async_runtime, &mut host_state.ctx, proxy, out);
            });
            self.state = Some(host_state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let (host_state, flows) = init_future.await;
                assert!(
                    proxy
                        .send_event(HostEvent::Initialized {
                            state: host_state,
                            flows,
                        })
                        .is_ok()
                );
            });
        }
    }

    #[allow(unused_mut)]
    fn user_event(&mut self, event_loop: &ActiveEventLoop, mut event: HostEvent<State, Event>) {
        match event {
            HostEvent::Initialized { state, flows } => {
                // Deferred wasm initialization arriving from `spawn_local`
                self.state = Some(state);
                self.flows = flows;

                // Force a resize so the surface is configured before the
                // first redraw
                let host_state = self.state.as_mut().unwrap();
                let size = host_state.ctx.window.inner_size();
                host_state.resize(size.width, size.height);
                self.flows.iter_mut().for_each(|flow| {
                    let out = flow.on_init(&mut host_state.ctx, &mut host_state.state);
                    let proxy = self.proxy.clone();
                    dispatch_out(
                        #[cfg(not(target_arch = "wasm32"))]
                        &self.async_runtime,
                        &mut host_state.ctx,
                        proxy,
                        out,
                    );
                });
                host_state.ctx.window.request_redraw();
            }
            HostEvent::Custom(custom_event) => {
                if let Some(state) = &mut self.state {
                    let leftover = self
                        .flows
                        .iter_mut()
                        .fold(Some(custom_event), |event, flow| {
                            flow.on_custom_events(&state.ctx, &mut state.state, event?)
                        });
                    if leftover.is_some() {
                        log::warn!("Warning! Custom event was not consumed this cycle");
                    }
                }
            }
            HostEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            // TODO: make the below factor configurable
            let speed_factor = 5.0;
            if let MouseButtonState::Left = state.ctx.mouse_pressed {
                state
                    .ctx
                    .camera
                    .controller
                    .handle_mouse(dx * speed_factor, dy * speed_factor);
            }
        }
        self.flows.iter_mut().for_each(|f| {
            let out = f.on_device_events(&state.ctx, &mut state.state, &event);
            let proxy = self.proxy.clone();
            dispatch_out(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut state.ctx,
                proxy,
                out,
            );
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // The orbit controller watches scroll events regardless of flows
        state.ctx.camera.controller.handle_window_events(&event);

        self.flows.iter_mut().for_each(|f| {
            let out = f.on_window_events(&state.ctx, &mut state.state, &event);
            let proxy = self.proxy.clone();
            dispatch_out(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut state.ctx,
                proxy,
                out,
            );
        });

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_frame.elapsed();
                self.last_frame = Instant::now();

                match state.render(
                    &mut self.flows,
                    #[cfg(feature = "integration-tests")]
                    &self.async_runtime,
                    #[cfg(feature = "integration-tests")]
                    &self.proxy,
                ) {
                    Ok(_) => {
                        // Apply accumulated camera input and refresh the uniform
                        state
                            .ctx
                            .camera
                            .controller
                            .update(&mut state.ctx.camera.camera, dt);
                        state
                            .ctx
                            .camera
                            .uniform
                            .update_view_proj(&state.ctx.camera.camera, &state.ctx.projection);
                        state.ctx.queue.write_buffer(
                            &state.ctx.camera.buffer,
                            0,
                            bytemuck::cast_slice(&[state.ctx.camera.uniform]),
                        );
                        // Per-frame flow updates, e.g. the reveal progress
                        self.flows.iter_mut().for_each(|f| {
                            let out = f.on_update(&state.ctx, &mut state.state, dt);
                            let proxy = self.proxy.clone();
                            dispatch_out(
                                #[cfg(not(target_arch = "wasm32"))]
                                &self.async_runtime,
                                &mut state.ctx,
                                proxy,
                                out,
                            );
                        });
                    }
                    // Reconfigure a lost or outdated surface and carry on
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                match (button, button_state.is_pressed()) {
                    (MouseButton::Left, true) => {
                        state.ctx.mouse_pressed = MouseButtonState::Left;
                    }
                    (MouseButton::Right, true) => {
                        state.ctx.mouse_pressed = MouseButtonState::Right;
                    }
                    (_, false) => state.ctx.mouse_pressed = MouseButtonState::None,
                    _ => (),
                };
            }
            _ => {}
        }
    }
}

/// Resolve a flow hook's output: run configuration closures immediately and
/// push resolved futures back into the loop as custom events.
fn dispatch_out<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    ctx: &mut Context,
    proxy: winit::event_loop::EventLoopProxy<HostEvent<State, Event>>,
    out: Out<Event>,
) {
    match out {
        Out::FutEvent(futures) => {
            let fut =
                async move { futures::future::join_all(futures.into_iter().map(Pin::from)).await };
            #[cfg(not(target_arch = "wasm32"))]
            {
                let resolved = async_runtime.block_on(fut);
                resolved.into_iter().for_each(|event| {
                    if let Err(err) = proxy.send_event(HostEvent::Custom(event)) {
                        log::error!("{}", err);
                        panic!("Event loop was closed before all events could be processed.")
                    }
                });
            }

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    let resolved = fut.await;
                    for event in resolved {
                        assert!(proxy.send_event(HostEvent::Custom(event)).is_ok());
                    }
                });
            }
        }
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Build the window, construct every flow and hand control to winit.
///
/// Blocks until the window closes (or, under `integration-tests`, until every
/// flow reports its render assertions as passed).
pub fn run<State: 'static + Default, Event: 'static>(
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<HostEvent<State, Event>> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<HostEvent<State, Event>> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(not(feature = "integration-tests"))]
    let event_loop: EventLoop<HostEvent<State, Event>> = EventLoop::with_user_event().build()?;

    let mut host: Host<State, Event> = Host::new(&event_loop, constructors);

    event_loop.run_app(&mut host)?;

    Ok(())
}
