//! Render composition and pipeline batching.
//!
//! View flows describe what to draw with a [`Render`]; the loop sorts every
//! flow's mesh draws into per-pipeline batches (settled model, dissolve,
//! transparent, each with culled and two-sided variants) so each pipeline is
//! bound once per frame.
//!
//! # Key types
//!
//! - [`Render<'a>`] is what a flow returns from `on_render`
//! - [`MeshDraw<'a>`] is one mesh draw: geometry, node transform, material
//!   bind group and pass selection

use crate::data_structures::model::Mesh;

/// Which pipeline family a draw belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Settled meshes rendered with their authored material.
    Model,
    /// Meshes still revealing through the dissolve pass.
    Dissolve,
    /// Alpha-blended geometry (placeholder cube).
    Transparent,
}

/// Data for one mesh draw: geometry, per-node transform buffer, material
/// bind group and the pass that should draw it.
pub struct MeshDraw<'a> {
    pub mesh: &'a Mesh,
    pub transform: &'a wgpu::Buffer,
    pub material: &'a wgpu::BindGroup,
    pub two_sided: bool,
    pub pass: Pass,
}

/// Draws batched per pipeline so each pipeline is set once per frame.
#[derive(Default)]
pub(crate) struct PassBatches<'a> {
    pub model: Vec<MeshDraw<'a>>,
    pub model_two_sided: Vec<MeshDraw<'a>>,
    pub dissolve: Vec<MeshDraw<'a>>,
    pub dissolve_two_sided: Vec<MeshDraw<'a>>,
    pub transparent: Vec<MeshDraw<'a>>,
}

impl<'a> PassBatches<'a> {
    fn push(&mut self, draw: MeshDraw<'a>) {
        match (draw.pass, draw.two_sided) {
            (Pass::Model, false) => self.model.push(draw),
            (Pass::Model, true) => self.model_two_sided.push(draw),
            (Pass::Dissolve, false) => self.dissolve.push(draw),
            (Pass::Dissolve, true) => self.dissolve_two_sided.push(draw),
            (Pass::Transparent, _) => self.transparent.push(draw),
        }
    }
}

/// What one view flow wants drawn this frame.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Draw(MeshDraw)` renders a single mesh
/// - `Draws(Vec<MeshDraw>)` renders a batch of meshes
/// - `Composed(Vec<Render>)` flattens nested renders of a composite flow
pub enum Render<'a> {
    None,
    Draw(MeshDraw<'a>),
    Draws(Vec<MeshDraw<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn collect_into(self, batches: &mut PassBatches<'a>) {
        match self {
            Render::Draw(draw) => batches.push(draw),
            Render::Draws(draws) => draws.into_iter().for_each(|draw| batches.push(draw)),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect_into(batches)),
            Render::None => (),
        }
    }
}
