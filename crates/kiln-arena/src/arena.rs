//! Per-frame arenas: ordered slab sets issuing growable segments.

use crate::config::ArenaConfig;
use crate::slab::Slab;

/// A buffer segment issued from a slab.
///
/// Plain handle: `(slab index, offset, capacity)`. The arena that issued
/// it is the only one that can resolve it; resolving a segment against a
/// different arena is a programmer error and panics (or reads garbage of
/// the correct type — handles carry no arena identity, matching their
/// single-frame scope).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub(crate) slab: u16,
    pub(crate) offset: u32,
    pub(crate) capacity: u32,
}

impl Segment {
    /// Capacity of this segment in elements.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// An ordered set of slabs owned by one frame, for one element type.
///
/// Allocation scans existing slabs first fit and appends a new slab when
/// none has room. Memory exhaustion is fatal: backing `Vec` allocation
/// aborts the process on OOM (Rust global allocator), and there is no
/// graceful degradation path — an allocation that cannot be satisfied
/// indicates a sizing bug or true exhaustion.
pub struct FrameArena<T> {
    slabs: Vec<Slab<T>>,
    config: ArenaConfig,
}

impl<T: Clone + Default> FrameArena<T> {
    /// Create an empty arena. No slabs are allocated until first use.
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            slabs: Vec::new(),
            config,
        }
    }

    /// Allocate a segment with capacity at least `min_count`.
    ///
    /// Draws from an existing slab with sufficient free contiguous space,
    /// else from a newly allocated slab appended to the arena.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u16::MAX` slabs (sizing bug).
    pub fn allocate(&mut self, min_count: u32) -> Segment {
        for (i, slab) in self.slabs.iter_mut().enumerate() {
            if let Some((offset, capacity)) = slab.try_allocate(min_count) {
                return Segment {
                    slab: i as u16,
                    offset,
                    capacity,
                };
            }
        }

        assert!(
            self.slabs.len() < u16::MAX as usize,
            "arena slab count exceeded {}",
            u16::MAX
        );

        let item_size = std::mem::size_of::<T>();
        let capacity = self.config.ideal_slab_items(item_size).max(min_count);
        let mut slab = Slab::new(capacity);
        let (offset, capacity) = slab
            .try_allocate(min_count)
            .expect("fresh slab is sized for the request, allocation cannot fail");
        self.slabs.push(slab);
        Segment {
            slab: (self.slabs.len() - 1) as u16,
            offset,
            capacity,
        }
    }

    /// Return a segment to its owning slab's free list.
    ///
    /// The vacated storage is cleared. Reuse is same-frame only; the
    /// free list is discarded at [`reset`](Self::reset).
    ///
    /// # Panics
    ///
    /// Panics if the segment's slab index is not part of this arena.
    pub fn free(&mut self, segment: Segment) {
        let slab = self
            .slabs
            .get_mut(segment.slab as usize)
            .expect("segment does not belong to this arena");
        slab.free(segment.offset, segment.capacity);
    }

    /// Reallocate a segment to hold at least `min_capacity` elements,
    /// copying the first `live_len` elements and freeing the original.
    ///
    /// The new capacity is at least double the old one (growth increment
    /// capped by config), bounded below by `min_capacity`.
    pub fn grow(&mut self, segment: Segment, live_len: u32, min_capacity: u32) -> Segment {
        debug_assert!(live_len <= segment.capacity);
        let new_capacity = self.config.growth_target(segment.capacity, min_capacity);
        let replacement = self.allocate(new_capacity);

        // The two segments may share a slab, so stage the live prefix
        // through a temporary rather than borrowing both ranges at once.
        let live: Vec<T> = self.slice(segment, live_len).to_vec();
        self.slice_mut(replacement, live_len).clone_from_slice(&live);

        self.free(segment);
        replacement
    }

    /// Shared view of the first `len` elements of a segment.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the segment's capacity or the segment
    /// does not belong to this arena.
    pub fn slice(&self, segment: Segment, len: u32) -> &[T] {
        assert!(
            len <= segment.capacity,
            "slice of {len} elements exceeds segment capacity {}",
            segment.capacity
        );
        self.slabs[segment.slab as usize].slice(segment.offset, len)
    }

    /// Mutable view of the first `len` elements of a segment.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the segment's capacity or the segment
    /// does not belong to this arena.
    pub fn slice_mut(&mut self, segment: Segment, len: u32) -> &mut [T] {
        assert!(
            len <= segment.capacity,
            "slice of {len} elements exceeds segment capacity {}",
            segment.capacity
        );
        self.slabs[segment.slab as usize].slice_mut(segment.offset, len)
    }

    /// Reset every slab for reuse by the next frame.
    ///
    /// All outstanding segments become garbage; the frame lifecycle
    /// guarantees none are live when this runs.
    pub fn reset(&mut self) {
        for slab in &mut self.slabs {
            slab.reset();
        }
    }

    /// Number of slabs currently owned by this arena.
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Total memory held by this arena's slabs, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.slabs.iter().map(|s| s.memory_bytes()).sum()
    }
}
