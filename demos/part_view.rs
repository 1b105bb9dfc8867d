//! Minimal part viewer: requests one model, shows the pulsing placeholder
//! while nothing is on screen and clears a textual loading indicator once the
//! scene is instantiated. The model dissolves in over the first ~0.6 seconds
//! after loading, then reverts to its authored materials.
//!
//! Expects the model below under `./assets/`.

use instant::Duration;
use reveal_ngin::{
    DeviceEvent, WindowEvent,
    context::Context,
    placeholder::PlaceholderView,
    render::Render,
    view::{self, FlowConstructor, Out, ViewFlow},
    viewer::{ModelViewer, ViewerEvent},
};

#[cfg(feature = "integration-tests")]
use reveal_ngin::view::ImageTestResult;

const MODEL_URL: &str = "parts/sample.glb";

/// Stand-in for the host UI: owns the "loading" state the `ModelReady`
/// notification clears.
struct LoadingIndicator {
    loading: bool,
}

impl ViewFlow<(), ViewerEvent> for LoadingIndicator {
    fn on_init(&mut self, _: &mut Context, _: &mut ()) -> Out<ViewerEvent> {
        println!("Retrieving part data…");
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut (), _: Duration) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut (),
        _: &DeviceEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut (),
        _: &WindowEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        _: &mut (),
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        match event {
            ViewerEvent::ModelReady => {
                if self.loading {
                    self.loading = false;
                    println!("Model ready — drag to rotate, scroll to zoom");
                }
                None
            }
            other => Some(other),
        }
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut (),
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

fn main() -> anyhow::Result<()> {
    let model: FlowConstructor<(), ViewerEvent> = Box::new(|ctx| {
        Box::pin(async move {
            Box::new(ModelViewer::with_model(ctx, MODEL_URL)) as Box<dyn ViewFlow<_, _>>
        })
    });
    let placeholder: FlowConstructor<(), ViewerEvent> = Box::new(|ctx| {
        Box::pin(async move { Box::new(PlaceholderView::new(&ctx)) as Box<dyn ViewFlow<_, _>> })
    });
    let indicator: FlowConstructor<(), ViewerEvent> = Box::new(|_| {
        Box::pin(async move {
            Box::new(LoadingIndicator { loading: true }) as Box<dyn ViewFlow<_, _>>
        })
    });

    view::run(vec![model, placeholder, indicator])
}
