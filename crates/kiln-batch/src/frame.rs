//! Frames: batch containers owning all per-submission transient memory.

use std::sync::Mutex;

use kiln_arena::{ArenaConfig, FrameArena, SlabCache};
use kiln_core::{DrawCall, FrameError, FrameId};

use crate::batch::Batch;
use crate::combiner::{CombineContext, CombinerRegistry};

/// Frame lifecycle states.
///
/// Transitions: `Initialized → Preparing → Prepared → Drawn → Disposed`,
/// then back to `Initialized` via [`Frame::initialize`] when the frame
/// is reused from a pool. Operations in the wrong state are reported
/// immediately as [`FrameError::InvalidState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Accepting batches.
    Initialized,
    /// Combine pass and final sort in progress.
    Preparing,
    /// Ready for the encoding layer to iterate.
    Prepared,
    /// Drawn; release-after-draw batches have been returned.
    Drawn,
    /// Torn down; slabs are reclaimed on the next initialize.
    Disposed,
}

impl FrameState {
    fn name(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Preparing => "preparing",
            Self::Prepared => "prepared",
            Self::Drawn => "drawn",
            Self::Disposed => "disposed",
        }
    }
}

/// A frame: the exclusive owner of all memory issued from its slabs and
/// the container for one submission's batches.
///
/// Not safe for concurrent mutation — one logical producer thread builds
/// a frame. The internal release list is lock-protected because the
/// combine pass appends to it and may itself run from whichever thread
/// invokes [`prepare`](Self::prepare).
pub struct Frame {
    id: FrameId,
    state: FrameState,
    slabs: SlabCache,
    batches: Vec<Option<Batch>>,
    to_release: Mutex<Vec<Batch>>,
}

impl Frame {
    /// Create a frame with default arena configuration, ready to accept
    /// batches.
    pub fn new(id: FrameId) -> Self {
        Self::with_config(id, ArenaConfig::default())
    }

    /// Create a frame whose arenas use `config`.
    pub fn with_config(id: FrameId, config: ArenaConfig) -> Self {
        Self {
            id,
            state: FrameState::Initialized,
            slabs: SlabCache::new(config),
            batches: Vec::new(),
            to_release: Mutex::new(Vec::new()),
        }
    }

    /// This frame's ID.
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Re-initialize a disposed frame for reuse from a pool.
    ///
    /// Slabs are reset (their storage is retained but all prior contents
    /// are garbage) and the frame accepts batches again under a new ID.
    pub fn initialize(&mut self, id: FrameId) -> Result<(), FrameError> {
        if self.state != FrameState::Disposed {
            return Err(FrameError::InvalidState {
                expected: FrameState::Disposed.name(),
                actual: self.state.name(),
            });
        }
        self.id = id;
        self.slabs.reset();
        self.batches.clear();
        self.to_release.lock().unwrap().clear();
        self.state = FrameState::Initialized;
        Ok(())
    }

    /// The frame's draw-call arena. Batches push their payload through
    /// here while the frame is being built.
    pub fn draw_arena(&mut self) -> &mut FrameArena<DrawCall> {
        self.slabs.arena_mut::<DrawCall>()
    }

    /// The frame's arena for an arbitrary element type (vertex staging,
    /// index staging, and similar per-frame payloads).
    pub fn arena_mut<T: Clone + Default + Send + 'static>(&mut self) -> &mut FrameArena<T> {
        self.slabs.arena_mut::<T>()
    }

    /// Move a batch into this frame.
    ///
    /// Sets the container back-reference; the batch's kind and layer are
    /// immutable from here on. Only legal while the frame is
    /// [`Initialized`](FrameState::Initialized).
    pub fn add(&mut self, mut batch: Batch) -> Result<(), FrameError> {
        if self.state != FrameState::Initialized {
            return Err(FrameError::InvalidState {
                expected: FrameState::Initialized.name(),
                actual: self.state.name(),
            });
        }
        if batch.container().is_some() {
            return Err(FrameError::BatchAlreadyOwned);
        }
        batch.set_container(Some(self.id));
        self.batches.push(Some(batch));
        Ok(())
    }

    /// Number of batch slots, nulled ones included.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// The frame's batch slots, in draw order once prepared. Nulled
    /// slots (eliminated by merging) sort last.
    pub fn batches(&self) -> &[Option<Batch>] {
        &self.batches
    }

    /// Run the combine pass and the final submission sort.
    ///
    /// Combining shuffles batches to group by kind; the final sort then
    /// restores `(kind, layer)` draw order, stably, so equal keys keep
    /// their relative input order. Returns the number of batches
    /// eliminated by merging.
    pub fn prepare(&mut self, registry: &CombinerRegistry) -> Result<usize, FrameError> {
        if self.state != FrameState::Initialized {
            return Err(FrameError::InvalidState {
                expected: FrameState::Initialized.name(),
                actual: self.state.name(),
            });
        }
        self.state = FrameState::Preparing;

        let Self {
            slabs,
            batches,
            to_release,
            ..
        } = self;
        let mut ctx = CombineContext {
            arena: slabs.arena_mut::<DrawCall>(),
        };
        let eliminated = registry
            .combine_batches(&mut ctx, batches, to_release)
            .map_err(|reason| FrameError::CombineFailed { reason })?;

        // Stable: ties broken by relative input order. Nulled slots last.
        batches.sort_by_key(|slot| (slot.is_none(), slot.as_ref().map(Batch::key)));

        self.state = FrameState::Prepared;
        Ok(eliminated)
    }

    /// Record that the frame has been drawn and return release-after-draw
    /// batches' storage to the slabs.
    pub fn mark_drawn(&mut self) -> Result<(), FrameError> {
        if self.state != FrameState::Prepared {
            return Err(FrameError::InvalidState {
                expected: FrameState::Prepared.name(),
                actual: self.state.name(),
            });
        }
        let Self {
            slabs, to_release, ..
        } = self;
        let arena = slabs.arena_mut::<DrawCall>();
        for mut batch in to_release.lock().unwrap().drain(..) {
            batch.release_draws(arena);
        }
        self.state = FrameState::Drawn;
        Ok(())
    }

    /// Tear the frame down: release every remaining batch's draw list.
    ///
    /// Idempotent. The slabs themselves are reclaimed (reset) by the
    /// next [`initialize`](Self::initialize), matching pool reuse.
    pub fn dispose(&mut self) {
        if self.state == FrameState::Disposed {
            return;
        }
        let Self {
            slabs,
            batches,
            to_release,
            ..
        } = self;
        let arena = slabs.arena_mut::<DrawCall>();
        for mut batch in to_release.lock().unwrap().drain(..) {
            batch.release_draws(arena);
        }
        for slot in batches.iter_mut() {
            if let Some(mut batch) = slot.take() {
                batch.release_draws(arena);
            }
        }
        batches.clear();
        self.state = FrameState::Disposed;
    }

    /// Total memory held by this frame's slabs, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.slabs.memory_bytes()
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.dispose();
    }
}
