//! Per-frame cache of typed arenas, keyed by element type.

use std::any::{Any, TypeId};

use indexmap::IndexMap;

use crate::arena::FrameArena;
use crate::config::ArenaConfig;

/// Object-safe view of a typed arena, for reset and accounting.
trait AnyArena: Any + Send {
    fn reset_arena(&mut self);
    fn arena_memory_bytes(&self) -> usize;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Clone + Default + Send + 'static> AnyArena for FrameArena<T> {
    fn reset_arena(&mut self) {
        self.reset();
    }

    fn arena_memory_bytes(&self) -> usize {
        self.memory_bytes()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A frame's set of typed arenas: "allocate a buffer segment of element
/// type `T` with minimum size N" resolves through here.
///
/// Arenas are created lazily on first use of each element type and kept
/// (storage included) across frame reuse; [`reset`](Self::reset) rewinds
/// them all at frame re-initialization. Iteration order is insertion
/// order, so reset and accounting are deterministic.
pub struct SlabCache {
    arenas: IndexMap<TypeId, Box<dyn AnyArena>>,
    config: ArenaConfig,
}

impl SlabCache {
    /// Create an empty cache. Arenas inherit `config`.
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            arenas: IndexMap::new(),
            config,
        }
    }

    /// The typed arena for element type `T`, created on first use.
    pub fn arena_mut<T: Clone + Default + Send + 'static>(&mut self) -> &mut FrameArena<T> {
        let config = &self.config;
        let entry = self
            .arenas
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(FrameArena::<T>::new(config.clone())));
        entry
            .as_any_mut()
            .downcast_mut::<FrameArena<T>>()
            .expect("slab cache entry matches its TypeId key")
    }

    /// Reset every arena for reuse by the next frame.
    pub fn reset(&mut self) {
        for arena in self.arenas.values_mut() {
            arena.reset_arena();
        }
    }

    /// Number of distinct element types with an arena.
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// Total memory held across all arenas, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.arenas.values().map(|a| a.arena_memory_bytes()).sum()
    }
}

impl Default for SlabCache {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

// Compile-time assertion: SlabCache must be Send (frames move between
// the producer thread and the draw thread).
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<SlabCache>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::DrawList;

    #[test]
    fn arenas_are_created_lazily_per_type() {
        let mut cache = SlabCache::default();
        assert_eq!(cache.arena_count(), 0);
        cache.arena_mut::<u32>().allocate(4);
        cache.arena_mut::<u64>().allocate(4);
        cache.arena_mut::<u32>().allocate(4);
        assert_eq!(cache.arena_count(), 2);
    }

    #[test]
    fn reset_rewinds_every_arena() {
        let mut cache = SlabCache::default();
        let mut list = DrawList::new();
        list.extend_from_slice(cache.arena_mut::<u32>(), &[1, 2, 3]);
        cache.reset();
        let seg = cache.arena_mut::<u32>().allocate(4);
        assert!(seg.capacity() >= 4);
        assert_eq!(cache.arena_mut::<u32>().slab_count(), 1);
    }

    #[test]
    fn memory_is_accounted_across_types() {
        let mut cache = SlabCache::default();
        cache.arena_mut::<u32>().allocate(4);
        let one = cache.memory_bytes();
        cache.arena_mut::<u64>().allocate(4);
        assert!(cache.memory_bytes() > one);
    }
}
