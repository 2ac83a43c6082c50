//! Per-pipeline frame coordination: disposal draining, boundary hooks,
//! and the combiner registry.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};
use kiln_batch::{BatchCombiner, CombinerRegistry, Frame};
use kiln_core::{Disposable, FrameError};

use crate::disposal::DisposalQueue;
use crate::metrics::SubmitMetrics;

/// A deferred closure run at the next frame boundary.
pub type Hook = Box<dyn FnOnce() + Send>;

/// Owns the per-pipeline pieces that must agree on frame boundaries:
/// the disposal queue, the combiner registry, boundary hooks, and the
/// paired device locks.
///
/// One coordinator per rendering pipeline; nothing here is global, so
/// two pipelines (or two tests) never share combiner or disposal state.
///
/// [`run_frame_boundary`](Self::run_frame_boundary) is called once per
/// boundary, from a single thread, in this order: after-present hooks
/// (the present preceding the boundary has completed), then freeze and
/// dispose pending disposals, then before-prepare hooks for the
/// upcoming frame.
pub struct FrameCoordinator {
    disposals: DisposalQueue,
    registry: Mutex<CombinerRegistry>,
    metrics: SubmitMetrics,
    before_prepare_tx: Sender<Hook>,
    before_prepare_rx: Receiver<Hook>,
    after_present_tx: Sender<Hook>,
    after_present_rx: Receiver<Hook>,
    create_resource_lock: Arc<Mutex<()>>,
    use_resource_lock: Arc<Mutex<()>>,
}

impl FrameCoordinator {
    /// Create a coordinator with an empty registry and queue.
    pub fn new() -> Self {
        let (before_prepare_tx, before_prepare_rx) = unbounded();
        let (after_present_tx, after_present_rx) = unbounded();
        Self {
            disposals: DisposalQueue::new(),
            registry: Mutex::new(CombinerRegistry::new()),
            metrics: SubmitMetrics::default(),
            before_prepare_tx,
            before_prepare_rx,
            after_present_tx,
            after_present_rx,
            create_resource_lock: Arc::new(Mutex::new(())),
            use_resource_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Add a combiner strategy to this pipeline's registry.
    pub fn register_combiner(&self, combiner: Box<dyn BatchCombiner>) {
        self.registry.lock().unwrap().register(combiner);
    }

    /// Remove the named strategy. Returns whether one was removed.
    pub fn unregister_combiner(&self, name: &str) -> bool {
        self.registry.lock().unwrap().unregister(name)
    }

    /// Run `frame`'s combine-and-sort pass against this pipeline's
    /// registry and record the result in the metrics.
    ///
    /// Returns the number of batches eliminated by merging.
    pub fn prepare_frame(&self, frame: &mut Frame) -> Result<usize, FrameError> {
        let registry = self.registry.lock().unwrap();
        let eliminated = frame.prepare(&registry)?;
        self.metrics.record_prepare(eliminated);
        Ok(eliminated)
    }

    /// Hand a retired resource to the disposal queue. Safe from any
    /// thread; destruction happens at a later frame boundary.
    pub fn dispose_resource(&self, resource: Box<dyn Disposable>) {
        self.disposals.enqueue(resource);
    }

    /// Schedule `hook` to run just before the next frame's prepare.
    pub fn before_prepare(&self, hook: Hook) {
        self.before_prepare_tx
            .send(hook)
            .expect("hook channel receiver lives as long as the coordinator");
    }

    /// Schedule `hook` to run just after the next present completes.
    pub fn after_present(&self, hook: Hook) {
        self.after_present_tx
            .send(hook)
            .expect("hook channel receiver lives as long as the coordinator");
    }

    /// Run one frame boundary: after-present hooks, then freeze and
    /// destroy pending disposals, then before-prepare hooks.
    ///
    /// Returns the number of resources destroyed.
    pub fn run_frame_boundary(&self) -> usize {
        let mut hooks = 0;
        for hook in self.after_present_rx.try_iter() {
            hook();
            hooks += 1;
        }

        let frozen = self.disposals.freeze_current_list();
        let disposed = self.disposals.dispose_list_contents(frozen);
        self.metrics.record_disposed(disposed);

        for hook in self.before_prepare_rx.try_iter() {
            hook();
            hooks += 1;
        }
        self.metrics.record_hooks(hooks);
        disposed
    }

    /// Lock serializing cross-thread resource creation on the device.
    pub fn create_resource_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.create_resource_lock)
    }

    /// Lock serializing cross-thread resource use on the device.
    pub fn use_resource_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.use_resource_lock)
    }

    /// The disposal queue owned by this coordinator.
    pub fn disposals(&self) -> &DisposalQueue {
        &self.disposals
    }

    /// Cumulative pipeline metrics.
    pub fn metrics(&self) -> &SubmitMetrics {
        &self.metrics
    }
}

impl Default for FrameCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

// Compile-time assertion: the coordinator is shared across producer
// threads and workers.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<FrameCoordinator>();
};
