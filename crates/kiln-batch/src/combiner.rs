//! The combiner registry and the combine pass.
//!
//! Combiners are strategy objects detecting and performing merges of
//! two compatible batches. The registry holds them in registration
//! order and owns nothing global: each pipeline constructs its own.

use std::sync::Mutex;

use smallvec::SmallVec;

use kiln_arena::FrameArena;
use kiln_core::{CombineError, DrawCall};

use crate::batch::Batch;

/// Arena access handed to combiners while they merge draw lists.
pub struct CombineContext<'a> {
    /// The frame's draw-call arena. Merges move payload between lists
    /// through here.
    pub arena: &'a mut FrameArena<DrawCall>,
}

/// Result of a successful merge.
pub struct Merged {
    /// The merged batch, written back at the anchor slot.
    pub batch: Batch,
    /// Batches fully absorbed by the merge. Those marked release-after-
    /// draw are appended to the caller's release list; the rest are
    /// dropped (their storage is reclaimed at frame teardown).
    pub displaced: SmallVec<[Batch; 2]>,
}

/// A strategy that detects and performs merging of two compatible
/// batches.
///
/// `combine` is only ever called with operands whose `(kind, layer)`
/// keys are equal — the pass enforces the boundary itself, so a
/// combiner never needs to re-check it. A combiner must preserve that
/// key on the merged result.
pub trait BatchCombiner: Send + Sync {
    /// Unique name, used for unregistration and error reporting.
    fn name(&self) -> &str;

    /// Whether this strategy can merge `a` and `b`.
    ///
    /// Called with key-equal operands only. Typical implementations
    /// check the batch kind they handle plus capacity or state limits.
    fn can_combine(&self, a: &Batch, b: &Batch) -> bool;

    /// Merge `a` and `b` into one batch.
    ///
    /// Both operands are consumed, including on failure — an error
    /// propagates to the caller of the pass with no rollback.
    fn combine(
        &self,
        ctx: &mut CombineContext<'_>,
        a: Batch,
        b: Batch,
    ) -> Result<Merged, CombineError>;
}

/// An ordered set of combiner strategies, owned per pipeline instance.
#[derive(Default)]
pub struct CombinerRegistry {
    combiners: SmallVec<[Box<dyn BatchCombiner>; 4]>,
}

impl CombinerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a combiner. Strategies are consulted in registration order.
    pub fn register(&mut self, combiner: Box<dyn BatchCombiner>) {
        self.combiners.push(combiner);
    }

    /// Remove the combiner with the given name. Returns whether one was
    /// removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        match self.combiners.iter().position(|c| c.name() == name) {
            Some(idx) => {
                self.combiners.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of registered combiners.
    pub fn len(&self) -> usize {
        self.combiners.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.combiners.is_empty()
    }

    /// Sort `batches` by `(kind, layer)` and merge adjacent compatible
    /// batches, nulling eliminated slots. Returns the eliminated count.
    ///
    /// Batches displaced by a merge that are marked release-after-draw
    /// are appended to `release_list` under its lock; multiple passes
    /// may share one release list concurrently.
    ///
    /// The scan performs no slot writes until the first combiner
    /// reports a real merge. The anchor does not advance after a merge,
    /// so a merged batch keeps absorbing subsequent compatible batches
    /// in its group.
    pub fn combine_batches(
        &self,
        ctx: &mut CombineContext<'_>,
        batches: &mut [Option<Batch>],
        release_list: &Mutex<Vec<Batch>>,
    ) -> Result<usize, CombineError> {
        // Eliminated (None) slots sort first, then (kind, layer).
        batches.sort_unstable_by_key(|slot| slot.as_ref().map(Batch::key));

        let len = batches.len();
        let mut i = 0;
        let mut j = 1;
        let mut eliminated = 0;

        while i < len && j < len {
            let a_key = match &batches[i] {
                Some(batch) => batch.key(),
                None => {
                    i += 1;
                    j = i + 1;
                    continue;
                }
            };
            let b_key = match &batches[j] {
                Some(batch) => batch.key(),
                None => {
                    j += 1;
                    continue;
                }
            };

            // A kind or layer boundary closes the current group. Merges
            // are never attempted across it, whatever the combiners say.
            if a_key != b_key {
                i = j;
                j = i + 1;
                continue;
            }

            for combiner in &self.combiners {
                let (a_ref, b_ref) = match (&batches[i], &batches[j]) {
                    (Some(a), Some(b)) => (a, b),
                    _ => unreachable!("both slots checked non-null above"),
                };
                if !combiner.can_combine(a_ref, b_ref) {
                    continue;
                }

                let a = batches[i].take().expect("anchor slot checked non-null");
                let b = batches[j].take().expect("probe slot checked non-null");
                let container = a.container();

                let Merged {
                    mut batch,
                    displaced,
                } = combiner.combine(ctx, a, b)?;

                if batch.key() != a_key {
                    return Err(CombineError::KeyMismatch {
                        combiner: combiner.name().to_string(),
                        expected_kind: a_key.kind,
                        expected_layer: a_key.layer,
                        actual_kind: batch.kind(),
                        actual_layer: batch.layer(),
                    });
                }

                // The merged batch lands at the anchor slot and inherits
                // its container.
                batch.set_container(container);
                batches[i] = Some(batch);
                eliminated += 1;

                if !displaced.is_empty() {
                    let mut releases = release_list.lock().unwrap();
                    for d in displaced {
                        if d.release_after_draw() {
                            releases.push(d);
                        }
                    }
                }
                break;
            }

            // The probe always advances; the anchor only moves at a
            // group boundary (greedy chain merge).
            j += 1;
        }

        Ok(eliminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_arena::ArenaConfig;
    use kiln_core::{BatchKindId, MaterialId, TextureId};
    use proptest::prelude::*;
    use smallvec::smallvec;

    // ── test combiners ───────────────────────────────────────────

    /// Merges any two batches of one kind by absorbing the probe's
    /// draws into the anchor.
    struct AppendCombiner {
        kind: BatchKindId,
    }

    impl BatchCombiner for AppendCombiner {
        fn name(&self) -> &str {
            "append"
        }

        fn can_combine(&self, a: &Batch, _b: &Batch) -> bool {
            a.kind() == self.kind
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

    /// Claims compatibility, then fails.
    struct FailingCombiner {
        kind: BatchKindId,
    }

    impl BatchCombiner for FailingCombiner {
        fn name(&self) -> &str {
            "failing"
        }

        fn can_combine(&self, a: &Batch, _b: &Batch) -> bool {
            a.kind() == self.kind
        }

        fn combine(
            &self,
            _ctx: &mut CombineContext<'_>,
            _a: Batch,
            _b: Batch,
        ) -> Result<Merged, CombineError> {
            Err(CombineError::StrategyFailed {
                combiner: "failing".to_string(),
                reason: "deliberate test failure".to_string(),
            })
        }
    }

    /// Claims it can merge anything, regardless of kind or layer. The
    /// pass must still never feed it a cross-boundary pair.
    struct GreedyCombiner;

    impl BatchCombiner for GreedyCombiner {
        fn name(&self) -> &str {
            "greedy"
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
            assert_eq!(a.key(), b.key(), "pass fed a cross-boundary pair");
            a.draws_mut().absorb(ctx.arena, b.draws_mut());
            Ok(Merged {
                batch: a,
                displaced: smallvec![b],
            })
        }
    }

    // ── helpers ──────────────────────────────────────────────────

    fn make_batch(
        arena: &mut FrameArena<DrawCall>,
        kind: BatchKindId,
        layer: i32,
        draw_count: u32,
    ) -> Batch {
        let mut batch = Batch::new(kind, layer, MaterialId(0));
        for n in 0..draw_count {
            batch.push_draw(arena, DrawCall::new(TextureId(0), n * 6, 6));
        }
        batch
    }

    fn run_pass(
        registry: &CombinerRegistry,
        arena: &mut FrameArena<DrawCall>,
        batches: &mut [Option<Batch>],
    ) -> usize {
        let releases = Mutex::new(Vec::new());
        registry
            .combine_batches(&mut CombineContext { arena }, batches, &releases)
            .unwrap()
    }

    // ── tests ────────────────────────────────────────────────────

    #[test]
    fn merges_same_kind_same_layer_pair_leaving_other_kinds() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind_a = BatchKindId::next();
        let kind_b = BatchKindId::next();

        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(AppendCombiner { kind: kind_a }));

        let mut batches = vec![
            Some(make_batch(&mut arena, kind_a, 0, 3)),
            Some(make_batch(&mut arena, kind_a, 0, 2)),
            Some(make_batch(&mut arena, kind_b, 0, 1)),
        ];

        let eliminated = run_pass(&registry, &mut arena, &mut batches);
        assert_eq!(eliminated, 1);

        let survivors: Vec<&Batch> = batches.iter().flatten().collect();
        assert_eq!(survivors.len(), 2);
        let merged = survivors.iter().find(|b| b.kind() == kind_a).unwrap();
        assert_eq!(merged.draw_count(), 5);
        let untouched = survivors.iter().find(|b| b.kind() == kind_b).unwrap();
        assert_eq!(untouched.draw_count(), 1);
    }

    #[test]
    fn chained_merge_absorbs_whole_group() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind = BatchKindId::next();

        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(AppendCombiner { kind }));

        // Four compatible batches: the anchor is not advanced after a
        // merge, so one survivor absorbs all three others.
        let mut batches: Vec<Option<Batch>> = (0..4)
            .map(|_| Some(make_batch(&mut arena, kind, 0, 2)))
            .collect();

        let eliminated = run_pass(&registry, &mut arena, &mut batches);
        assert_eq!(eliminated, 3);

        let survivors: Vec<&Batch> = batches.iter().flatten().collect();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].draw_count(), 8);
    }

    #[test]
    fn never_merges_across_layer_boundary() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind = BatchKindId::next();

        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(GreedyCombiner));

        let mut batches = vec![
            Some(make_batch(&mut arena, kind, 0, 1)),
            Some(make_batch(&mut arena, kind, 1, 1)),
            Some(make_batch(&mut arena, kind, 2, 1)),
        ];

        let eliminated = run_pass(&registry, &mut arena, &mut batches);
        assert_eq!(eliminated, 0);
        assert_eq!(batches.iter().flatten().count(), 3);
    }

    #[test]
    fn never_merges_across_kind_boundary() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(GreedyCombiner));

        let mut batches = vec![
            Some(make_batch(&mut arena, BatchKindId::next(), 0, 1)),
            Some(make_batch(&mut arena, BatchKindId::next(), 0, 1)),
        ];

        let eliminated = run_pass(&registry, &mut arena, &mut batches);
        assert_eq!(eliminated, 0);
    }

    #[test]
    fn second_pass_eliminates_nothing() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind = BatchKindId::next();

        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(AppendCombiner { kind }));

        let mut batches: Vec<Option<Batch>> = (0..5)
            .map(|n| Some(make_batch(&mut arena, kind, (n % 2) as i32, 1)))
            .collect();

        let first = run_pass(&registry, &mut arena, &mut batches);
        assert!(first > 0);
        let second = run_pass(&registry, &mut arena, &mut batches);
        assert_eq!(second, 0);
    }

    #[test]
    fn first_matching_combiner_wins_by_registration_order() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind = BatchKindId::next();

        // The failing combiner is registered first; it claims the pair
        // before the append combiner ever runs.
        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(FailingCombiner { kind }));
        registry.register(Box::new(AppendCombiner { kind }));

        let mut batches = vec![
            Some(make_batch(&mut arena, kind, 0, 1)),
            Some(make_batch(&mut arena, kind, 0, 1)),
        ];

        let releases = Mutex::new(Vec::new());
        let result = registry.combine_batches(
            &mut CombineContext { arena: &mut arena },
            &mut batches,
            &releases,
        );
        assert!(matches!(
            result,
            Err(CombineError::StrategyFailed { .. })
        ));
    }

    #[test]
    fn error_keeps_prior_eliminations_in_effect() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind_ok = BatchKindId::next();
        let kind_bad = BatchKindId::next();
        assert!(kind_ok < kind_bad, "sort puts the mergeable group first");

        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(AppendCombiner { kind: kind_ok }));
        registry.register(Box::new(FailingCombiner { kind: kind_bad }));

        let mut batches = vec![
            Some(make_batch(&mut arena, kind_bad, 0, 1)),
            Some(make_batch(&mut arena, kind_ok, 0, 1)),
            Some(make_batch(&mut arena, kind_ok, 0, 1)),
            Some(make_batch(&mut arena, kind_bad, 0, 1)),
        ];

        let releases = Mutex::new(Vec::new());
        let result = registry.combine_batches(
            &mut CombineContext { arena: &mut arena },
            &mut batches,
            &releases,
        );
        assert!(result.is_err());

        // The kind_ok pair merged before the failure; no rollback.
        let ok_survivors = batches
            .iter()
            .flatten()
            .filter(|b| b.kind() == kind_ok)
            .count();
        assert_eq!(ok_survivors, 1);
    }

    #[test]
    fn released_batches_reach_the_release_list() {
        let mut arena = FrameArena::new(ArenaConfig::default());
        let kind = BatchKindId::next();

        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(AppendCombiner { kind }));

        let mut pooled = make_batch(&mut arena, kind, 0, 1);
        pooled.set_release_after_draw(true);
        let mut batches = vec![
            Some(make_batch(&mut arena, kind, 0, 1)),
            Some(pooled),
        ];

        let releases = Mutex::new(Vec::new());
        let eliminated = registry
            .combine_batches(
                &mut CombineContext { arena: &mut arena },
                &mut batches,
                &releases,
            )
            .unwrap();
        assert_eq!(eliminated, 1);
        assert_eq!(releases.lock().unwrap().len(), 1);
    }

    #[test]
    fn unregister_removes_by_name() {
        let mut registry = CombinerRegistry::new();
        registry.register(Box::new(AppendCombiner {
            kind: BatchKindId(1),
        }));
        assert!(registry.unregister("append"));
        assert!(!registry.unregister("append"));
        assert!(registry.is_empty());
    }

    proptest! {
        /// After one pass converges, a second pass over the same set
        /// always eliminates zero batches.
        #[test]
        fn combine_is_idempotent_after_convergence(
            layout in proptest::collection::vec((0u8..3, 0i32..3), 0..24)
        ) {
            let mut arena = FrameArena::new(ArenaConfig::default());
            let kinds = [BatchKindId::next(), BatchKindId::next(), BatchKindId::next()];

            let mut registry = CombinerRegistry::new();
            registry.register(Box::new(AppendCombiner { kind: kinds[0] }));

            let mut batches: Vec<Option<Batch>> = layout
                .iter()
                .map(|&(k, layer)| Some(make_batch(&mut arena, kinds[k as usize], layer, 1)))
                .collect();

            run_pass(&registry, &mut arena, &mut batches);
            let second = run_pass(&registry, &mut arena, &mut batches);
            prop_assert_eq!(second, 0);
        }
    }
}
