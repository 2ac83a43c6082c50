//! Cumulative submission-pipeline metrics.
//!
//! [`SubmitMetrics`] is a set of shared counters bumped by the
//! coordinator as frames move through the pipeline; consumers
//! (telemetry, tests) read a coherent copy via
//! [`snapshot`](SubmitMetrics::snapshot).

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared cumulative counters for the submission pipeline.
///
/// Counters are bumped from the coordinator thread and may be read from
/// any thread. All counters are monotonic over the coordinator's
/// lifetime.
#[derive(Debug, Default)]
pub struct SubmitMetrics {
    frames_prepared: AtomicU64,
    batches_eliminated: AtomicU64,
    resources_disposed: AtomicU64,
    hooks_run: AtomicU64,
}

impl SubmitMetrics {
    /// Record one prepared frame and the batches its combine pass
    /// eliminated.
    pub fn record_prepare(&self, eliminated: usize) {
        self.frames_prepared.fetch_add(1, Ordering::Relaxed);
        self.batches_eliminated
            .fetch_add(eliminated as u64, Ordering::Relaxed);
    }

    /// Record resources destroyed at a frame boundary.
    pub fn record_disposed(&self, count: usize) {
        self.resources_disposed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record boundary hooks drained and run.
    pub fn record_hooks(&self, count: usize) {
        self.hooks_run.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Read a coherent copy of all counters.
    pub fn snapshot(&self) -> SubmitMetricsSnapshot {
        SubmitMetricsSnapshot {
            frames_prepared: self.frames_prepared.load(Ordering::Relaxed),
            batches_eliminated: self.batches_eliminated.load(Ordering::Relaxed),
            resources_disposed: self.resources_disposed.load(Ordering::Relaxed),
            hooks_run: self.hooks_run.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SubmitMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubmitMetricsSnapshot {
    /// Cumulative number of frames run through the combine pass.
    pub frames_prepared: u64,
    /// Cumulative number of batches eliminated by merging.
    pub batches_eliminated: u64,
    /// Cumulative number of resources destroyed at frame boundaries.
    pub resources_disposed: u64,
    /// Cumulative number of boundary hooks drained and run.
    pub hooks_run: u64,
}
