//! Frame-scoped batches of draw calls.

use kiln_arena::{DrawList, FrameArena};
use kiln_core::{BatchKindId, DrawCall, FrameId, MaterialId};

/// Derived `(kind, layer)` ordering key.
///
/// The derived `Ord` compares kind first, then layer ascending — the
/// grouping order the combine pass and the final frame sort both use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchKey {
    /// Concrete batch kind.
    pub kind: BatchKindId,
    /// Layer within the frame; lower layers draw first.
    pub layer: i32,
}

/// A tagged collection of draw calls, lifetime-scoped to one frame.
///
/// Built detached from any container: create, push draws against the
/// frame's arena, then move it into the frame with `Frame::add`. Once
/// added, kind and layer are immutable — there is no mutable access to
/// them, and the container back-reference pins the batch to its frame.
#[derive(Debug)]
pub struct Batch {
    kind: BatchKindId,
    layer: i32,
    material: MaterialId,
    draws: DrawList<DrawCall>,
    release_after_draw: bool,
    container: Option<FrameId>,
}

impl Batch {
    /// Create a detached batch with an empty draw list.
    pub fn new(kind: BatchKindId, layer: i32, material: MaterialId) -> Self {
        Self {
            kind,
            layer,
            material,
            draws: DrawList::new(),
            release_after_draw: false,
            container: None,
        }
    }

    /// Concrete kind of this batch.
    pub fn kind(&self) -> BatchKindId {
        self.kind
    }

    /// Layer of this batch within its frame.
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Material this batch draws with.
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Derived ordering key.
    pub fn key(&self) -> BatchKey {
        BatchKey {
            kind: self.kind,
            layer: self.layer,
        }
    }

    /// The frame that owns this batch, if it has been added to one.
    pub fn container(&self) -> Option<FrameId> {
        self.container
    }

    pub(crate) fn set_container(&mut self, frame: Option<FrameId>) {
        self.container = frame;
    }

    /// Whether this batch returns to a pool after the frame draws.
    ///
    /// Batches displaced by a merge with this flag set are appended to
    /// the frame's release list instead of being dropped in place.
    pub fn release_after_draw(&self) -> bool {
        self.release_after_draw
    }

    /// Mark this batch for release after draw.
    pub fn set_release_after_draw(&mut self, release: bool) {
        self.release_after_draw = release;
    }

    /// Number of draw calls in this batch.
    pub fn draw_count(&self) -> u32 {
        self.draws.len()
    }

    /// The batch's draw-call list.
    pub fn draws(&self) -> &DrawList<DrawCall> {
        &self.draws
    }

    /// Mutable access to the draw-call list.
    ///
    /// Payload mutation stays legal for the batch's whole lifetime; only
    /// kind and layer freeze on add.
    pub fn draws_mut(&mut self) -> &mut DrawList<DrawCall> {
        &mut self.draws
    }

    /// Append one draw call against the owning frame's arena.
    pub fn push_draw(&mut self, arena: &mut FrameArena<DrawCall>, draw: DrawCall) {
        self.draws.push(arena, draw);
    }

    /// Release the draw list's storage back to the arena.
    pub(crate) fn release_draws(&mut self, arena: &mut FrameArena<DrawCall>) {
        self.draws.dispose(arena);
    }
}
