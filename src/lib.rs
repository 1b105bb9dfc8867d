//! reveal-ngin
//!
//! A lightweight, cross-platform 3D part-viewer engine focused on native and
//! WASM compatibility. When a model finishes loading, every mesh is first
//! rendered through a synthesized dissolve pass that progressively reveals
//! the surface with an ordered-dithering discard pattern; once the reveal
//! completes, each mesh reverts to its authored material. The crate exposes a
//! small surface for loading models, instantiating per-view scenes and
//! driving the reveal from the frame loop.
//!
//! High-level modules
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, materials, scenes)
//! - `placeholder`: the pulsing idle view shown before a model is requested
//! - `pipelines`: definitions for the render pipelines (model, dissolve, transparent)
//! - `render`: render composition for efficient pipeline reuse
//! - `resources`: helpers to load models/textures and the template cache
//! - `reveal`: dissolve math, reveal progress and the material state machine
//! - `view`: high level flow control (views / update loop)
//! - `viewer`: the model view with load cancellation and reveal lifecycle
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod placeholder;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod reveal;
pub mod view;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
