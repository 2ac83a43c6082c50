//! Criterion micro-benchmarks for the combine pass and frame prepare.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use kiln_batch::{CombinerRegistry, Frame};
use kiln_bench::{append_registry, layered_frame, sprite_heavy_frame};
use kiln_core::{BatchKindId, FrameId};
use kiln_test_utils::frame_with_batches;

fn bench_sprite_heavy(c: &mut Criterion) {
    let registry = append_registry();
    // Best case: every batch shares one key, the population collapses
    // to a single batch.
    c.bench_function("combine/sprite_heavy_256x4", |b| {
        b.iter_batched(
            || sprite_heavy_frame(256, 4).0,
            |mut frame| {
                let eliminated = frame.prepare(&registry).unwrap();
                black_box(eliminated);
                frame
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_layered_sort(c: &mut Criterion) {
    let registry = CombinerRegistry::new();
    // Worst case for merging: all keys distinct, the pass degenerates
    // to its sort.
    c.bench_function("combine/layered_sort_16x16", |b| {
        b.iter_batched(
            || layered_frame(16, 16),
            |mut frame| {
                let eliminated = frame.prepare(&registry).unwrap();
                black_box(eliminated);
                frame
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_mixed(c: &mut Criterion) {
    let registry = append_registry();
    // Two batches per (kind, layer) key: half the population merges away.
    c.bench_function("combine/layered_merge_8x8", |b| {
        b.iter_batched(
            || {
                let shape: Vec<(i32, u32)> = (0..8).map(|layer| (layer, 4)).collect();
                let mut frame = Frame::new(FrameId(0));
                for _ in 0..8 {
                    let kind = BatchKindId::next();
                    frame = frame_with_batches(frame, kind, &shape);
                    frame = frame_with_batches(frame, kind, &shape);
                }
                frame
            },
            |mut frame| {
                let eliminated = frame.prepare(&registry).unwrap();
                black_box(eliminated);
                frame
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_sprite_heavy, bench_layered_sort, bench_mixed);
criterion_main!(benches);
