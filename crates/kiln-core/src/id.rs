//! Strongly-typed identifiers for batches, materials, and frames.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Counter for unique [`BatchKindId`] allocation.
static BATCH_KIND_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Identifies a concrete batch kind (the "type identity" of a batch).
///
/// Batch kinds replace open-ended runtime type dispatch: each distinct
/// batch implementation registers one kind at startup via
/// [`BatchKindId::next`] and tags every batch it produces with it. Two
/// batches are only ever considered for merging when their kinds match.
///
/// Allocated from a monotonic atomic counter, so two registrations always
/// receive different IDs even across independent pipelines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKindId(pub u32);

impl BatchKindId {
    /// Allocate a fresh, unique batch kind ID.
    pub fn next() -> Self {
        Self(BATCH_KIND_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BatchKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BatchKindId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a material (shader + state block) owned by the platform layer.
///
/// The core never dereferences materials; it only groups and compares by ID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MaterialId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a texture referenced by a draw call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TextureId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a frame within the submission pipeline.
///
/// Used as the container back-reference on batches: a batch added to a
/// frame records that frame's ID and may not move to another container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u32);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FrameId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
