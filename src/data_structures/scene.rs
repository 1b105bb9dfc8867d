//! Scene templates and per-view scene instances.
//!
//! A [`SceneTemplate`] is the immutable, shared result of loading a model:
//! the glTF node tree with authored materials, cached by source URL and never
//! mutated. A [`SceneInstance`] is the per-view clone produced from it —
//! transforms and material slots belong solely to the instance while geometry
//! buffers and textures stay shared references. Material capture and dissolve
//! synthesis happen at instantiation; the per-frame tick advances the reveal
//! and settles meshes back onto their captured originals.

use std::sync::Arc;

use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::{Material, Mesh},
        transform::Transform,
    },
    pipelines::dissolve::DissolveMaterial,
    render::{MeshDraw, Pass},
    resources::texture::material_layout,
    reveal::{MaterialSlot, ProgressClock, RevealState},
};

/// One drawable primitive of a template node.
pub struct TemplatePrimitive {
    pub mesh: Mesh,
    pub material: Arc<Material>,
}

/// A node of the immutable template tree.
pub struct TemplateNode {
    pub name: String,
    pub transform: Transform,
    pub primitives: Vec<TemplatePrimitive>,
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn new(name: String, transform: Transform) -> Self {
        Self {
            name,
            transform,
            primitives: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Immutable, shared mesh hierarchy loaded from the asset source.
///
/// Owned by the template cache behind an `Arc`; instantiation only reads it.
pub struct SceneTemplate {
    key: String,
    root: TemplateNode,
}

impl SceneTemplate {
    pub fn new(key: impl Into<String>, root: TemplateNode) -> Self {
        Self {
            key: key.into(),
            root,
        }
    }

    /// The source URL this template was loaded from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Clone the template into an independent per-view instance.
    ///
    /// Walks the tree, composes world transforms and captures every mesh's
    /// authored material(s) before replacing the active material with a fresh
    /// dissolve pass at progress 0. The instance owns its transform buffers
    /// and dissolve materials; originals are only borrowed.
    pub fn instantiate(&self, device: &wgpu::Device) -> SceneInstance {
        let layout = material_layout(device);
        let mut nodes = Vec::new();
        collect_nodes(device, &layout, &self.root, &Transform::new(), &mut nodes);
        SceneInstance {
            key: self.key.clone(),
            clock: ProgressClock::new(),
            nodes,
        }
    }
}

fn collect_nodes(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    node: &TemplateNode,
    parent_world: &Transform,
    out: &mut Vec<MeshNode>,
) {
    let world = parent_world * &node.transform;
    if !node.primitives.is_empty() {
        out.push(MeshNode::new(device, layout, node, &world));
    }
    for child in &node.children {
        collect_nodes(device, layout, child, &world, out);
    }
}

/// A mesh of one scene instance.
///
/// Owns the node's world-transform buffer and the material slot; the slot
/// starts [`RevealState::Dissolving`] with the captured originals and settles
/// exactly once when the instance's progress reaches `1.0`.
pub struct MeshNode {
    pub name: String,
    meshes: Vec<Mesh>,
    transform_buffer: wgpu::Buffer,
    slot: MaterialSlot<DissolveMaterial, Vec<Arc<Material>>>,
}

impl MeshNode {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        node: &TemplateNode,
        world: &Transform,
    ) -> Self {
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Transform Buffer", node.name)),
            contents: bytemuck::cast_slice(&[world.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let meshes = node
            .primitives
            .iter()
            .map(|primitive| primitive.mesh.clone())
            .collect();
        // Capture before replacement. The dissolve pass derives from the
        // first material only, even for multi-material meshes; the full list
        // is restored on settle.
        let originals: Vec<Arc<Material>> = node
            .primitives
            .iter()
            .map(|primitive| primitive.material.clone())
            .collect();
        let dissolve = DissolveMaterial::from_original(device, &originals[0], layout);
        Self {
            name: node.name.clone(),
            meshes,
            transform_buffer,
            slot: MaterialSlot::new(dissolve, originals),
        }
    }

    pub fn state(&self) -> RevealState {
        self.slot.state()
    }

    /// Push the instance progress into this node's dissolve pass and settle
    /// once it reaches `1.0`. Safe to re-run after settling.
    fn apply_progress(&mut self, queue: &wgpu::Queue, progress: f32) {
        if let Some(dissolve) = self.slot.dissolve_mut() {
            dissolve.set_progress(queue, progress);
            if progress >= 1.0 {
                // Swap back to the captured originals, dropping the pass
                self.slot.settle();
            }
        }
    }

    fn get_render<'a>(&'a self, out: &mut Vec<MeshDraw<'a>>) {
        match &self.slot {
            MaterialSlot::Dissolving { dissolve, .. } => {
                for mesh in &self.meshes {
                    out.push(MeshDraw {
                        mesh,
                        transform: &self.transform_buffer,
                        material: &dissolve.bind_group,
                        two_sided: dissolve.double_sided,
                        pass: Pass::Dissolve,
                    });
                }
            }
            MaterialSlot::Settled { original } => {
                for (mesh, material) in self.meshes.iter().zip(original.iter()) {
                    out.push(MeshDraw {
                        mesh,
                        transform: &self.transform_buffer,
                        material: &material.bind_group,
                        two_sided: material.double_sided,
                        pass: Pass::Model,
                    });
                }
            }
        }
    }
}

/// A per-view clone of a scene template, exclusively owned by its view.
///
/// Dropping the instance releases its transform buffers and any
/// still-dissolving materials; template resources survive through their
/// remaining references.
pub struct SceneInstance {
    key: String,
    clock: ProgressClock,
    nodes: Vec<MeshNode>,
}

impl SceneInstance {
    /// The key of the template this instance was cloned from.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn progress(&self) -> f32 {
        self.clock.value()
    }

    /// Whether every mesh has reverted to its authored material.
    pub fn is_settled(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.state() == RevealState::Settled)
    }

    /// Advance the reveal by the frame delta.
    ///
    /// Each node is updated independently, so one problematic mesh never
    /// stops the rest of the instance from revealing.
    pub fn tick(&mut self, queue: &wgpu::Queue, dt: Duration) {
        if self.clock.is_complete() && self.is_settled() {
            return;
        }
        let progress = self.clock.advance(dt);
        for node in &mut self.nodes {
            node.apply_progress(queue, progress);
        }
    }

    pub fn get_render(&self) -> Vec<MeshDraw<'_>> {
        let mut draws = Vec::new();
        for node in &self.nodes {
            node.get_render(&mut draws);
        }
        draws
    }
}
