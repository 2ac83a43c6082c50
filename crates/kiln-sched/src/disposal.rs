//! Double-buffered collection of resources pending safe destruction.

use std::sync::{Arc, Mutex};

use kiln_core::Disposable;

/// Maximum number of empty lists kept for reuse.
const SPARE_POOL_CAPACITY: usize = 4;

/// One batch of pending disposals, with its own lock.
///
/// Per-list locking is the point of the design: producers append to the
/// current list under that list's lock while the coordinator freezes
/// and drains a different list without contending.
#[derive(Default)]
pub struct DisposalList {
    entries: Mutex<Vec<Box<dyn Disposable>>>,
}

impl DisposalList {
    fn push(&self, resource: Box<dyn Disposable>) {
        self.entries.lock().unwrap().push(resource);
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for DisposalList {
    /// Last-resort destruction for entries that land after the final
    /// drain of a list the spare pool has no room for. The queue drains
    /// lists before discarding them, so this usually runs on an empty
    /// vector.
    fn drop(&mut self) {
        for mut entry in self.entries.get_mut().unwrap().drain(..) {
            entry.dispose();
        }
    }
}

/// A double-buffered collector decoupling "resource retired" from
/// "resource destroyed."
///
/// `enqueue` is safe from many threads concurrently; `freeze` and
/// `dispose_list_contents` are driven by a single coordinator thread
/// once per frame boundary. A resource enqueued before a given freeze
/// appears in exactly the list that freeze returns, exactly once, and
/// is never double-destroyed.
pub struct DisposalQueue {
    /// Pointer to the current destination list. Held only long enough
    /// to clone or swap the pointer, never while touching entries.
    current: Mutex<Arc<DisposalList>>,
    /// Bounded pool of empty lists for reuse across freeze cycles.
    spares: Mutex<Vec<Arc<DisposalList>>>,
}

impl DisposalQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Arc::new(DisposalList::default())),
            spares: Mutex::new(Vec::new()),
        }
    }

    /// Append a resource to the current list.
    ///
    /// Locks the current list only, so concurrent enqueues from many
    /// threads contend on one short append, not on the whole queue.
    pub fn enqueue(&self, resource: Box<dyn Disposable>) {
        let list = Arc::clone(&self.current.lock().unwrap());
        list.push(resource);
    }

    /// Atomically swap in a fresh current list (drawn from the spare
    /// pool, or newly allocated) and return the old one, fully
    /// populated, to the caller.
    ///
    /// This is the single synchronization point handing off a batch of
    /// pending disposals; `enqueue` calls racing the swap land in one
    /// list or the other, never both.
    pub fn freeze_current_list(&self) -> Arc<DisposalList> {
        let replacement = self
            .spares
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_default();
        let mut current = self.current.lock().unwrap();
        std::mem::replace(&mut *current, replacement)
    }

    /// Destroy every entry in `list` and clear it, then return the
    /// empty list to the spare pool if there is room.
    ///
    /// An enqueue that cloned the list pointer just before the freeze
    /// may append between drains, so the drain loops until it observes
    /// the list empty under its lock. An entry that still lands after
    /// the final check rides the pooled list to a later boundary, or is
    /// destroyed by the list's `Drop` if the pool is full — never lost,
    /// never destroyed twice.
    ///
    /// Returns the number of resources destroyed.
    pub fn dispose_list_contents(&self, list: Arc<DisposalList>) -> usize {
        let mut disposed = 0;
        loop {
            let mut entries = list.entries.lock().unwrap();
            if entries.is_empty() {
                break;
            }
            for mut entry in entries.drain(..) {
                entry.dispose();
                disposed += 1;
            }
        }

        let mut spares = self.spares.lock().unwrap();
        if spares.len() < SPARE_POOL_CAPACITY {
            spares.push(list);
        }
        disposed
    }

    /// Number of spare lists currently pooled.
    pub fn spare_count(&self) -> usize {
        self.spares.lock().unwrap().len()
    }

    /// Number of entries waiting in the current list.
    pub fn pending_count(&self) -> usize {
        self.current.lock().unwrap().len()
    }
}

impl Default for DisposalQueue {
    fn default() -> Self {
        Self::new()
    }
}

// Compile-time assertion: the queue is shared across producer threads
// and the coordinator.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<DisposalQueue>();
};
