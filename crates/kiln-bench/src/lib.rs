//! Benchmark profiles and utilities for the kiln pipeline.
//!
//! Provides pre-built frame populations for benchmarking and examples:
//!
//! - [`sprite_heavy_frame`]: many small same-kind batches, the shape a
//!   2D scene produces and the best case for the combine pass
//! - [`layered_frame`]: batches spread across kinds and layers, the
//!   worst case for merging and the stress case for the final sort

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kiln_batch::{CombinerRegistry, Frame};
use kiln_core::{BatchKindId, FrameId};
use kiln_test_utils::{frame_with_batches, AppendCombiner};

/// Build a frame of `batches` same-kind, same-layer batches with
/// `draws_per_batch` draw calls each.
///
/// With an append combiner registered the whole population collapses to
/// one batch, so this profile measures pure merge throughput.
pub fn sprite_heavy_frame(batches: u32, draws_per_batch: u32) -> (Frame, BatchKindId) {
    let kind = BatchKindId::next();
    let shape: Vec<(i32, u32)> = (0..batches).map(|_| (0, draws_per_batch)).collect();
    (
        frame_with_batches(Frame::new(FrameId(0)), kind, &shape),
        kind,
    )
}

/// Build a frame whose batches are spread across `layers` layers, one
/// batch per layer per kind, for `kinds` distinct kinds.
///
/// No two batches share a `(kind, layer)` key, so nothing merges and
/// the combine pass degenerates to its sort.
pub fn layered_frame(kinds: u32, layers: i32) -> Frame {
    let mut frame = Frame::new(FrameId(0));
    for _ in 0..kinds {
        let kind = BatchKindId::next();
        let shape: Vec<(i32, u32)> = (0..layers).rev().map(|layer| (layer, 4)).collect();
        frame = frame_with_batches(frame, kind, &shape);
    }
    frame
}

/// A registry holding the permissive append combiner.
pub fn append_registry() -> CombinerRegistry {
    let mut registry = CombinerRegistry::new();
    registry.register(Box::new(AppendCombiner));
    registry
}
