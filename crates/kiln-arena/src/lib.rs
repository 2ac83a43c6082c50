//! Per-frame slab arenas and arena-backed draw-call lists.
//!
//! All transient draw data for a frame lives in slabs owned by that
//! frame. Lists carve growable segments out of the slabs and return them
//! when disposed; the frame resets every slab at re-initialization, so
//! nothing allocated here survives a frame boundary.
//!
//! # Architecture
//!
//! ```text
//! SlabCache (per frame, one arena per element type)
//! └── FrameArena<T>
//!     └── Slab<T>[] (bump cursor + same-frame free list)
//!         └── Segment (slab index, offset, capacity) → DrawList<T>
//! ```
//!
//! # Ownership
//!
//! A [`Segment`] is exclusively owned by the [`DrawList`] it was issued
//! to until the list is disposed or the frame is torn down. Slabs are
//! owned by exactly one frame at a time and are never shared across
//! concurrently-alive frames.
//!
//! # Safety
//!
//! All storage is `Vec<T>` with `T::default()` initialization. No
//! `MaybeUninit`, no `unsafe`. Vacated ranges are overwritten with
//! `T::default()` so element types holding owning references do not
//! extend unrelated object lifetimes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod cache;
pub mod config;
pub mod list;
pub mod slab;

pub use arena::{FrameArena, Segment};
pub use cache::SlabCache;
pub use config::ArenaConfig;
pub use list::DrawList;
