//! Kiln: the batch submission core of a real-time rendering pipeline.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all kiln sub-crates. For most users, adding `kiln` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use kiln::prelude::*;
//!
//! // Build one frame's worth of batches, out of draw order.
//! let sprites = BatchKindId::next();
//! let mut frame = Frame::new(FrameId(0));
//!
//! let mut overlay = Batch::new(sprites, 1, MaterialId(7));
//! overlay.push_draw(frame.draw_arena(), DrawCall::new(TextureId(3), 0, 6));
//! frame.add(overlay).unwrap();
//!
//! let mut world = Batch::new(sprites, 0, MaterialId(7));
//! world.push_draw(frame.draw_arena(), DrawCall::new(TextureId(3), 6, 6));
//! frame.add(world).unwrap();
//!
//! // The coordinator owns the combiner registry and disposal queue
//! // for one pipeline instance.
//! let coordinator = FrameCoordinator::new();
//! let eliminated = coordinator.prepare_frame(&mut frame).unwrap();
//! assert_eq!(eliminated, 0); // no combiners registered
//!
//! // Prepared batches come out in (kind, layer) draw order.
//! let layers: Vec<i32> = frame
//!     .batches()
//!     .iter()
//!     .flatten()
//!     .map(|b| b.layer())
//!     .collect();
//! assert_eq!(layers, vec![0, 1]);
//!
//! frame.mark_drawn().unwrap();
//! coordinator.run_frame_boundary();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kiln-core` | IDs, draw calls, `Disposable`, error types |
//! | [`arena`] | `kiln-arena` | Per-frame slab arenas and draw-call lists |
//! | [`batch`] | `kiln-batch` | Batches, frames, and the combine pass |
//! | [`sched`] | `kiln-sched` | Disposal queue, worker threads, coordination |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`kiln-core`).
///
/// Contains the strongly-typed IDs, the [`types::DrawCall`] payload,
/// the [`types::Disposable`] trait, and per-subsystem error types.
pub use kiln_core as types;

/// Per-frame slab arenas and arena-backed lists (`kiln-arena`).
///
/// Most users reach this through [`batch::Frame`]'s arena accessors;
/// use the module directly for custom per-frame payload types.
pub use kiln_arena as arena;

/// Batches, frames, and the combine pass (`kiln-batch`).
///
/// The [`batch::BatchCombiner`] trait is the main extension point for
/// pipeline-specific merge strategies.
pub use kiln_batch as batch;

/// Disposal queue, worker threads, and frame coordination (`kiln-sched`).
pub use kiln_sched as sched;

/// Common imports for typical kiln usage.
///
/// ```rust
/// use kiln::prelude::*;
/// ```
///
/// This imports the most frequently used types: frames and batches, the
/// combiner trait, IDs and draw calls, the coordinator, and the worker
/// thread.
pub mod prelude {
    // Core types and IDs
    pub use kiln_core::{
        BatchKindId, Disposable, DrawCall, FrameId, MaterialId, TextureId,
    };

    // Errors
    pub use kiln_core::{CombineError, FrameError, WorkerError};

    // Arena
    pub use kiln_arena::{ArenaConfig, DrawList, FrameArena};

    // Batches and frames
    pub use kiln_batch::{
        Batch, BatchCombiner, BatchKey, CombineContext, CombinerRegistry, Frame, FrameState,
        Merged,
    };

    // Scheduling
    pub use kiln_sched::{DisposalQueue, FrameCoordinator, WorkerThread};
}
