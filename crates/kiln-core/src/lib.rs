//! Core types and traits for the kiln batch-submission pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the kiln workspace:
//! strongly-typed IDs, the draw-call payload, the `Disposable` trait,
//! and per-subsystem error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod draw;
pub mod error;
pub mod id;
pub mod traits;

pub use draw::DrawCall;
pub use error::{CombineError, FrameError, WorkerError};
pub use id::{BatchKindId, FrameId, MaterialId, TextureId};
pub use traits::Disposable;
