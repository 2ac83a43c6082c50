//! Batches, frames, and the combine pass.
//!
//! A [`Batch`] is a `(kind, layer)`-tagged collection of draw calls
//! whose payload lives in its frame's arena. Before submission, the
//! frame runs a combine pass over its batch set: batches are sorted by
//! `(kind, layer)` and adjacent compatible batches are merged by the
//! registered [`BatchCombiner`] strategies, cutting the number of GPU
//! submissions.
//!
//! # Control flow
//!
//! ```text
//! producer thread                 frame
//! ───────────────                 ─────
//! Batch::new → push draws  ──►    Frame::add (kind/layer frozen)
//!                                 Frame::prepare
//!                                   ├── CombinerRegistry::combine_batches
//!                                   │     (merge, null slots, release list)
//!                                   └── final stable (kind, layer) sort
//!                                 encoding layer iterates Frame::batches
//! ```
//!
//! The combiner registry is owned per pipeline instance, never global,
//! so independent pipelines and tests cannot contaminate each other.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod combiner;
pub mod frame;

pub use batch::{Batch, BatchKey};
pub use combiner::{BatchCombiner, CombineContext, CombinerRegistry, Merged};
pub use frame::{Frame, FrameState};
