//! Dissolve-reveal core: ordered-dithering math, reveal progress and the
//! per-mesh material state machine.
//!
//! The GPU side of the reveal lives in `pipelines/dissolve.wgsl`; this module
//! is the CPU source of truth for the same constants and predicates so the
//! behaviour can be asserted without a device. A mesh is revealed by
//! discarding fragments whose Bayer threshold exceeds the current progress,
//! so the surface densifies monotonically and independently of frame rate.

use cgmath::{InnerSpace, Vector3};
use instant::Duration;

/// 4x4 ordered Bayer matrix, row-major, indexed `py * 4 + px`, in sixteenths.
pub const BAYER_4X4: [u8; 16] = [0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5];

/// Progress gained per second; a full reveal takes 1 / RATE ≈ 0.625s.
pub const REVEAL_RATE: f32 = 1.6;

/// Default dither cell edge length in device pixels.
pub const CELL_SIZE: f32 = 6.0;

/// Fixed shading light direction, normalized in [`lambert`].
pub const LIGHT_DIR: [f32; 3] = [1.0, 2.0, 1.5];

/// Dither threshold for the cell containing fragment `(x, y)`, in `[0, 1)`.
pub fn bayer_threshold(x: u32, y: u32, cell_size: f32) -> f32 {
    let px = (x as f32 / cell_size).floor() as usize % 4;
    let py = (y as f32 / cell_size).floor() as usize % 4;
    BAYER_4X4[py * 4 + px] as f32 / 16.0
}

/// Whether the fragment at `(x, y)` is discarded at the given progress.
///
/// Once progress reaches `1.0` the test is skipped entirely and nothing is
/// discarded, so the pass output matches the settled material pixel for pixel.
pub fn discards(x: u32, y: u32, cell_size: f32, progress: f32) -> bool {
    progress < 1.0 && progress < bayer_threshold(x, y, cell_size)
}

/// Diffuse intensity for a surface normal under the fixed [`LIGHT_DIR`].
///
/// Matches the shader term `max(dot(n, l), 0.0) * 0.6 + 0.4`, so the result
/// is always within `[0.4, 1.0]`.
pub fn lambert(normal: Vector3<f32>) -> f32 {
    let l = Vector3::from(LIGHT_DIR).normalize();
    normal.normalize().dot(l).max(0.0) * 0.6 + 0.4
}

/// Reveal progress for one scene instance.
///
/// Monotonically non-decreasing in `[0, 1]`; `advance` clamps to exactly
/// `1.0` so completion checks against `1.0` are reliable.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressClock {
    value: f32,
}

impl ProgressClock {
    pub fn new() -> Self {
        Self { value: 0.0 }
    }

    /// Advance by the frame delta and return the new progress.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.value = (self.value + dt.as_secs_f32() * REVEAL_RATE).min(1.0);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_complete(&self) -> bool {
        self.value >= 1.0
    }
}

/// Reveal phase of a single mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Dissolving,
    Settled,
}

/// The active material of one mesh: the synthesized dissolve material while
/// revealing, the captured original afterwards — never neither, never both.
///
/// Generic over the two payloads so the transition logic stays testable
/// without GPU resources; the scene layer instantiates it with
/// `DissolveMaterial` and the captured `Arc<Material>` list.
pub enum MaterialSlot<D, M> {
    Dissolving { dissolve: D, original: M },
    Settled { original: M },
}

impl<D, M: Clone> MaterialSlot<D, M> {
    pub fn new(dissolve: D, original: M) -> Self {
        Self::Dissolving { dissolve, original }
    }

    pub fn state(&self) -> RevealState {
        match self {
            Self::Dissolving { .. } => RevealState::Dissolving,
            Self::Settled { .. } => RevealState::Settled,
        }
    }

    /// The captured original material(s), regardless of phase.
    pub fn original(&self) -> &M {
        match self {
            Self::Dissolving { original, .. } | Self::Settled { original } => original,
        }
    }

    /// The dissolve material while the mesh is still revealing.
    pub fn dissolve_mut(&mut self) -> Option<&mut D> {
        match self {
            Self::Dissolving { dissolve, .. } => Some(dissolve),
            Self::Settled { .. } => None,
        }
    }

    /// Swap the active material back to the captured original.
    ///
    /// Returns the dissolve material exactly once so the caller decides when
    /// it is dropped; repeating the call is a no-op and leaves the original
    /// in place, which makes the completion check safe to re-run at
    /// `progress == 1.0`.
    pub fn settle(&mut self) -> Option<D> {
        if let Self::Dissolving { original, .. } = self {
            let original = original.clone();
            match std::mem::replace(self, Self::Settled { original }) {
                Self::Dissolving { dissolve, .. } => Some(dissolve),
                Self::Settled { .. } => None,
            }
        } else {
            None
        }
    }
}
