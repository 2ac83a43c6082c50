//! Deferred disposal, worker threads, and frame coordination.
//!
//! The thread-facing half of the pipeline. A GPU resource retired on
//! any thread must not be destroyed while the device may still
//! reference it, so disposals are collected into a double-buffered
//! queue and drained at frame boundaries by the coordinator. Heavy
//! preparation work runs on persistent worker threads driven by a
//! request/wait counter handshake.
//!
//! # Threads and blocking points
//!
//! ```text
//! producers ──enqueue──► DisposalQueue ◄──freeze/dispose── coordinator
//! producers ──request_work──► WorkerThread ──deferred errors──► wait_for_pending_work
//! any thread ──before_prepare/after_present──► FrameCoordinator::run_frame_boundary
//! ```
//!
//! The only blocking points are `wait_for_pending_work` (bounded by
//! worker completion), `request_work`'s wait for worker startup, and
//! the worker's own wait for a wake signal.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod coordinator;
pub mod disposal;
pub mod metrics;
pub mod worker;

pub use coordinator::{FrameCoordinator, Hook};
pub use disposal::{DisposalList, DisposalQueue};
pub use metrics::{SubmitMetrics, SubmitMetricsSnapshot};
pub use worker::{WorkFn, WorkerThread};
