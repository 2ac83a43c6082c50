//! Test utilities and mock types for kiln development.
//!
//! Provides a destruction-counting [`TrackingResource`], canned work
//! functions for worker-thread tests, a permissive [`AppendCombiner`],
//! and a [`frame_with_batches`] builder for constructing frames with a
//! known batch population.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kiln_batch::{Batch, BatchCombiner, CombineContext, Frame, Merged};
use kiln_core::{BatchKindId, CombineError, Disposable, DrawCall, MaterialId, TextureId};
use smallvec::smallvec;

/// A disposable resource that counts how many times it was destroyed.
///
/// Create with [`TrackingResource::new_pair`] and assert on the shared
/// counter after the code under test has run; a count above one means a
/// double destruction.
pub struct TrackingResource {
    disposals: Arc<AtomicUsize>,
}

impl TrackingResource {
    /// Create a resource and the counter observing its destruction.
    pub fn new_pair() -> (Self, Arc<AtomicUsize>) {
        let disposals = Arc::new(AtomicUsize::new(0));
        (
            Self {
                disposals: Arc::clone(&disposals),
            },
            disposals,
        )
    }

    /// Boxed variant for handing straight to a disposal queue.
    pub fn boxed_pair() -> (Box<dyn Disposable>, Arc<AtomicUsize>) {
        let (resource, disposals) = Self::new_pair();
        (Box::new(resource), disposals)
    }
}

impl Disposable for TrackingResource {
    fn dispose(&mut self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

/// A work function that counts its invocations and always succeeds.
pub fn counting_work(invocations: &Arc<AtomicUsize>) -> Box<dyn FnMut() -> Result<(), String> + Send> {
    let invocations = Arc::clone(invocations);
    Box::new(move || {
        invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

/// A work function that always fails with `reason`.
pub fn failing_work(reason: &str) -> Box<dyn FnMut() -> Result<(), String> + Send> {
    let reason = reason.to_string();
    Box::new(move || Err(reason.clone()))
}

/// Merges any two batches in a group by appending draw calls.
///
/// The permissive strategy most tests want: the combine pass itself
/// still refuses merges across kind or layer boundaries.
pub struct AppendCombiner;

impl BatchCombiner for AppendCombiner {
    fn name(&self) -> &str {
        "test_append"
    }

    fn can_combine(&self, _a: &Batch, _b: &Batch) -> bool {
        true
    }

    fn combine(
        &self,
        ctx: &mut CombineContext<'_>,
        mut a: Batch,
        mut b: Batch,
    ) -> Result<Merged, CombineError> {
        a.draws_mut().absorb(ctx.arena, b.draws_mut());
        Ok(Merged {
            batch: a,
            displaced: smallvec![b],
        })
    }
}

/// Build an initialized frame holding one batch per `(layer, draws)`
/// entry, all of the given kind, each draw indexing six vertices.
pub fn frame_with_batches(frame: Frame, kind: BatchKindId, shape: &[(i32, u32)]) -> Frame {
    let mut frame = frame;
    for &(layer, draws) in shape {
        let mut batch = Batch::new(kind, layer, MaterialId(0));
        let arena = frame.draw_arena();
        for n in 0..draws {
            batch.push_draw(arena, DrawCall::new(TextureId(0), n * 6, 6));
        }
        frame
            .add(batch)
            .expect("test frame accepts unowned batches");
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::FrameId;

    #[test]
    fn tracking_resource_counts_disposals() {
        let (mut resource, disposals) = TrackingResource::new_pair();
        resource.dispose();
        resource.dispose();
        assert_eq!(disposals.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn frame_builder_populates_batches() {
        let kind = BatchKindId::next();
        let frame = frame_with_batches(Frame::new(FrameId(0)), kind, &[(0, 2), (1, 3)]);
        assert_eq!(frame.batches().iter().flatten().count(), 2);
    }
}
