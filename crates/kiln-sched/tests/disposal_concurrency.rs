//! Integration test: concurrent disposal under frame boundaries.
//!
//! Producer threads retire resources while the coordinator runs frame
//! boundaries in parallel, the way a render loop drains disposals while
//! loader threads keep retiring textures. Every resource must be
//! destroyed exactly once, whichever side of a freeze it lands on.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use kiln_sched::FrameCoordinator;
use kiln_test_utils::TrackingResource;

const PRODUCERS: usize = 4;
const RESOURCES_PER_PRODUCER: usize = 200;

#[test]
fn every_retired_resource_is_destroyed_exactly_once() {
    let coordinator = Arc::new(FrameCoordinator::new());
    let mut counters = Vec::new();
    let mut handles = Vec::new();

    for _ in 0..PRODUCERS {
        let mut batch = Vec::new();
        for _ in 0..RESOURCES_PER_PRODUCER {
            let (resource, disposals) = TrackingResource::boxed_pair();
            counters.push(disposals);
            batch.push(resource);
        }
        let coordinator = Arc::clone(&coordinator);
        handles.push(thread::spawn(move || {
            for resource in batch {
                coordinator.dispose_resource(resource);
            }
        }));
    }

    // Drain boundaries while producers are still enqueueing.
    while handles.iter().any(|h| !h.is_finished()) {
        coordinator.run_frame_boundary();
    }
    for handle in handles {
        handle.join().unwrap();
    }
    // One final boundary collects anything enqueued after the last drain.
    coordinator.run_frame_boundary();

    for disposals in &counters {
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
    }
    let total = coordinator.metrics().snapshot().resources_disposed;
    assert_eq!(total, (PRODUCERS * RESOURCES_PER_PRODUCER) as u64);
    assert_eq!(coordinator.disposals().pending_count(), 0);
}

#[test]
fn boundary_with_nothing_pending_is_a_no_op() {
    let coordinator = FrameCoordinator::new();
    assert_eq!(coordinator.run_frame_boundary(), 0);
    assert_eq!(coordinator.metrics().snapshot().resources_disposed, 0);
}
