//! Error types for the kiln batch-submission pipeline.
//!
//! One enum per subsystem: combine pass, worker thread, and frame
//! lifecycle. Arena misuse (out-of-range access, foreign segments) is a
//! programmer error and panics at the access site rather than surfacing
//! here; arena memory exhaustion is fatal by design.

use std::error::Error;
use std::fmt;

use crate::id::BatchKindId;

/// Errors from the batch combine pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombineError {
    /// A registered combiner failed while merging two batches it had
    /// claimed compatibility for. Eliminations performed before the
    /// failure remain in effect; both operand batches are consumed.
    StrategyFailed {
        /// Name of the failing combiner.
        combiner: String,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A combiner produced a merged batch whose kind or layer differs
    /// from its operands. The pass never feeds mismatched operands to a
    /// combiner, so this indicates a broken combiner implementation.
    KeyMismatch {
        /// Name of the offending combiner.
        combiner: String,
        /// Kind of the operands.
        expected_kind: BatchKindId,
        /// Layer of the operands.
        expected_layer: i32,
        /// Kind of the merged result.
        actual_kind: BatchKindId,
        /// Layer of the merged result.
        actual_layer: i32,
    },
}

impl fmt::Display for CombineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrategyFailed { combiner, reason } => {
                write!(f, "combiner '{combiner}' failed: {reason}")
            }
            Self::KeyMismatch {
                combiner,
                expected_kind,
                expected_layer,
                actual_kind,
                actual_layer,
            } => {
                write!(
                    f,
                    "combiner '{combiner}' changed batch key: expected (kind {expected_kind}, layer {expected_layer}), got (kind {actual_kind}, layer {actual_layer})"
                )
            }
        }
    }
}

impl Error for CombineError {}

/// Errors from the background worker thread.
///
/// Work-function failures are captured on the worker and deferred: the
/// next caller of `wait_for_pending_work` (or `request_work`, which waits
/// through the same path) observes them, wrapped to indicate the failure
/// originated off-thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerError {
    /// The work function returned an error on the worker thread.
    OffThread {
        /// Reason reported by the work function.
        reason: String,
    },
    /// The work function panicked on the worker thread. The worker
    /// survives and continues serving requests.
    OffThreadPanic {
        /// Stringified panic payload.
        message: String,
    },
    /// The worker has been disposed; no further requests are valid.
    Disposed,
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffThread { reason } => {
                write!(f, "an error occurred in a worker thread: {reason}")
            }
            Self::OffThreadPanic { message } => {
                write!(f, "a worker thread panicked: {message}")
            }
            Self::Disposed => write!(f, "worker thread has been disposed"),
        }
    }
}

impl Error for WorkerError {}

/// Errors from the frame lifecycle state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// An operation was attempted in the wrong lifecycle state
    /// (e.g. adding a batch to a frame that is already preparing).
    InvalidState {
        /// The state the operation requires.
        expected: &'static str,
        /// The state the frame was actually in.
        actual: &'static str,
    },
    /// The batch is already owned by a container and cannot be added
    /// again. Batch kind and layer are frozen on first add.
    BatchAlreadyOwned,
    /// The combine pass failed during frame preparation.
    CombineFailed {
        /// The underlying combine error.
        reason: CombineError,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState { expected, actual } => {
                write!(f, "frame state should have been {expected} but was {actual}")
            }
            Self::BatchAlreadyOwned => {
                write!(f, "batch is already owned by a container")
            }
            Self::CombineFailed { reason } => {
                write!(f, "combine pass failed: {reason}")
            }
        }
    }
}

impl Error for FrameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CombineFailed { reason } => Some(reason),
            _ => None,
        }
    }
}
