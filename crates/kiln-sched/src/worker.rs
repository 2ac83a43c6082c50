//! Persistent background worker with a request/wait counter handshake.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kiln_core::WorkerError;

/// How long `dispose` waits for the worker to exit before detaching it.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// The work function run by the worker thread.
///
/// Invoked once per pending-work unit. An `Err` is captured on the
/// worker and re-raised, wrapped, to the next caller of
/// [`WorkerThread::wait_for_pending_work`].
pub type WorkFn = Box<dyn FnMut() -> Result<(), String> + Send + 'static>;

/// Handshake state shared between producers and the worker.
struct WorkerState {
    /// Units of work requested but not yet completed. Incremented only
    /// by `request_work`, decremented only by the worker, once per
    /// invocation, success or failure.
    pending: u32,
    /// Set once the thread has completed startup.
    running: bool,
    /// True while the worker is idle, parked on the wake signal.
    waiting: bool,
    /// Error captured from the most recent failing invocation. A newer
    /// failure overwrites an uncollected older one.
    error: Option<WorkerError>,
    /// Cooperative shutdown flag, checked between invocations.
    shutdown: bool,
}

struct Shared {
    state: Mutex<WorkerState>,
    /// Worker parks here between drains.
    wake: Condvar,
    /// Producers park here: for startup, and for idle-with-zero-pending.
    completed: Condvar,
}

/// A persistent background thread driven by a many-producer /
/// single-consumer counter handshake.
///
/// Producers call [`request_work`](Self::request_work) to schedule one
/// unit of the configured work function and
/// [`wait_for_pending_work`](Self::wait_for_pending_work) to block
/// until the worker has drained. Work-function failures never kill the
/// thread; they surface, wrapped, from the next wait.
pub struct WorkerThread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerThread {
    /// Spawn the worker thread around `work`.
    pub fn spawn(work: WorkFn) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(WorkerState {
                pending: 0,
                running: false,
                waiting: false,
                error: None,
                shutdown: false,
            }),
            wake: Condvar::new(),
            completed: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("kiln-worker".to_string())
            .spawn(move || worker_loop(thread_shared, work))
            .expect("spawning the worker thread failed");
        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Schedule one unit of work and wake the worker.
    ///
    /// If the worker is not currently idle-and-waiting, this first
    /// blocks until it is — through the same path as
    /// [`wait_for_pending_work`](Self::wait_for_pending_work), so a
    /// deferred error from an earlier invocation surfaces here. Also
    /// blocks until the thread has completed startup on its first
    /// cycle.
    pub fn request_work(&self) -> Result<(), WorkerError> {
        let needs_wait = {
            let state = self.shared.state.lock().unwrap();
            if state.shutdown {
                return Err(WorkerError::Disposed);
            }
            !state.waiting
        };
        if needs_wait {
            self.wait_for_pending_work()?;
        }

        let mut state = self.shared.state.lock().unwrap();
        if state.shutdown {
            return Err(WorkerError::Disposed);
        }
        state.pending += 1;
        while !state.running {
            state = self.shared.completed.wait(state).unwrap();
        }
        drop(state);

        self.shared.wake.notify_one();
        Ok(())
    }

    /// Block until the worker is idle with a zero pending counter.
    ///
    /// Any captured invocation error is taken and returned wrapped as
    /// off-thread — checked both before parking and after the drain
    /// completes, so a failure from this drain surfaces here. Each
    /// error is observed exactly once; subsequent calls do not re-raise
    /// it.
    pub fn wait_for_pending_work(&self) -> Result<(), WorkerError> {
        let mut state = self.shared.state.lock().unwrap();
        if let Some(error) = state.error.take() {
            return Err(error);
        }
        if state.shutdown {
            return Err(WorkerError::Disposed);
        }
        while !(state.waiting && state.pending == 0) {
            if state.shutdown {
                return Err(WorkerError::Disposed);
            }
            state = self.shared.completed.wait(state).unwrap();
        }
        // An invocation that was still running when this caller parked
        // may have stored its error while we waited; it belongs to this
        // drain.
        if let Some(error) = state.error.take() {
            return Err(error);
        }
        Ok(())
    }

    /// Number of requested-but-incomplete work units.
    pub fn pending_count(&self) -> u32 {
        self.shared.state.lock().unwrap().pending
    }

    /// Shut the worker down cooperatively.
    ///
    /// Sets the shutdown flag (checked between work-function
    /// invocations), wakes the worker, and joins with a bounded
    /// timeout. If the join times out — the work function is stuck —
    /// the thread is detached as a last resort and exits when it next
    /// reaches the flag check. No further requests are valid.
    pub fn dispose(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.shared.state.lock().unwrap().shutdown = true;
        self.shared.wake.notify_all();
        self.shared.completed.notify_all();

        let deadline = Instant::now() + JOIN_TIMEOUT;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        if handle.is_finished() {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerThread {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn worker_loop(shared: Arc<Shared>, mut work: WorkFn) {
    let mut state = shared.state.lock().unwrap();
    state.running = true;
    state.waiting = true;
    shared.completed.notify_all();

    loop {
        while state.pending == 0 && !state.shutdown {
            state = shared.wake.wait(state).unwrap();
        }
        if state.shutdown {
            shared.completed.notify_all();
            return;
        }
        state.waiting = false;

        while state.pending > 0 && !state.shutdown {
            drop(state);
            let result = catch_unwind(AssertUnwindSafe(|| work()));
            state = shared.state.lock().unwrap();
            match result {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => {
                    state.error = Some(WorkerError::OffThread { reason });
                }
                Err(payload) => {
                    state.error = Some(WorkerError::OffThreadPanic {
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
            state.pending -= 1;
        }

        state.waiting = true;
        shared.completed.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_worker() -> (WorkerThread, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);
        let worker = WorkerThread::spawn(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        (worker, invocations)
    }

    #[test]
    fn request_then_wait_runs_the_work_function() {
        let (worker, invocations) = counting_worker();
        worker.request_work().unwrap();
        worker.wait_for_pending_work().unwrap();
        assert!(invocations.load(Ordering::SeqCst) >= 1);
        assert_eq!(worker.pending_count(), 0);
    }

    #[test]
    fn counter_drains_across_many_requests() {
        let (worker, invocations) = counting_worker();
        for _ in 0..16 {
            worker.request_work().unwrap();
        }
        worker.wait_for_pending_work().unwrap();
        assert_eq!(worker.pending_count(), 0);
        assert_eq!(invocations.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn work_error_surfaces_exactly_once() {
        let worker = WorkerThread::spawn(Box::new(|| Err("boom".to_string())));
        worker.request_work().unwrap();

        // The error is stored before the drain completes, so the first
        // wait is guaranteed to observe it.
        let err = worker.wait_for_pending_work().unwrap_err();
        assert_eq!(
            err,
            WorkerError::OffThread {
                reason: "boom".to_string()
            }
        );

        // ...and later waits do not re-raise it.
        assert_eq!(worker.wait_for_pending_work(), Ok(()));
    }

    #[test]
    fn error_from_an_in_flight_invocation_surfaces_on_the_first_wait() {
        // The invocation outlives the caller's arrival at the wait, so
        // the caller parks on the condvar and the error is stored while
        // it sleeps. It must still surface from this wait, not the next.
        let worker = WorkerThread::spawn(Box::new(|| {
            thread::sleep(Duration::from_millis(100));
            Err("boom".to_string())
        }));
        worker.request_work().unwrap();

        let err = worker.wait_for_pending_work().unwrap_err();
        assert_eq!(
            err,
            WorkerError::OffThread {
                reason: "boom".to_string()
            }
        );
        assert_eq!(worker.wait_for_pending_work(), Ok(()));
    }

    #[test]
    fn worker_survives_a_panicking_invocation() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let worker = WorkerThread::spawn(Box::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first call explodes");
            }
            Ok(())
        }));

        worker.request_work().unwrap();
        let err = worker.wait_for_pending_work().unwrap_err();
        assert!(matches!(err, WorkerError::OffThreadPanic { .. }));

        // The thread is still alive and serves the next request.
        worker.request_work().unwrap();
        worker.wait_for_pending_work().unwrap();
        assert!(hits.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn requests_after_dispose_are_rejected() {
        let (mut worker, _) = counting_worker();
        worker.dispose();
        assert_eq!(worker.request_work(), Err(WorkerError::Disposed));
    }

    #[test]
    fn dispose_is_idempotent() {
        let (mut worker, _) = counting_worker();
        worker.dispose();
        worker.dispose();
    }
}
