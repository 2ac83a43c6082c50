//! Growable typed lists backed by arena segments.

use std::marker::PhantomData;

use crate::arena::{FrameArena, Segment};

/// Capacity of a list's first segment when the initial request is small.
const INITIAL_CAPACITY: u32 = 4;

/// A growable typed sequence backed by an arena-issued segment.
///
/// Logical state is `(segment, len)`; all element storage lives in the
/// arena, so every operation takes the owning [`FrameArena`]. Growth
/// reallocates (at least doubling) and copies; capacity never shrinks
/// mid-frame. The list exclusively owns its segment until
/// [`dispose`](Self::dispose) or frame teardown.
///
/// Out-of-range indices are programmer errors and panic at the access
/// site.
#[derive(Debug)]
pub struct DrawList<T> {
    segment: Option<Segment>,
    len: u32,
    _element: PhantomData<fn() -> T>,
}

impl<T: Clone + Default> DrawList<T> {
    /// Create an empty list. No storage is allocated until the first push.
    pub fn new() -> Self {
        Self {
            segment: None,
            len: 0,
            _element: PhantomData,
        }
    }

    /// Number of elements in the list.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current capacity in elements (zero before the first push).
    pub fn capacity(&self) -> u32 {
        self.segment.map_or(0, |s| s.capacity())
    }

    /// Append one element, growing the backing segment if needed.
    /// Returns a mutable reference to the stored slot.
    pub fn push<'a>(&mut self, arena: &'a mut FrameArena<T>, item: T) -> &'a mut T {
        self.ensure_capacity(arena, self.len + 1);
        let segment = self.segment.expect("ensure_capacity issued a segment");
        let index = self.len as usize;
        self.len += 1;
        let slot = &mut arena.slice_mut(segment, self.len)[index];
        *slot = item;
        slot
    }

    /// Append a run of elements contiguously.
    pub fn extend_from_slice(&mut self, arena: &mut FrameArena<T>, items: &[T]) {
        if items.is_empty() {
            return;
        }
        let new_len = self.len + items.len() as u32;
        self.ensure_capacity(arena, new_len);
        let segment = self.segment.expect("ensure_capacity issued a segment");
        let start = self.len as usize;
        arena.slice_mut(segment, new_len)[start..].clone_from_slice(items);
        self.len = new_len;
    }

    /// Append the contents of `other` and dispose it.
    ///
    /// The usual merge primitive: the absorbed list's segment returns to
    /// its slab for same-frame reuse.
    pub fn absorb(&mut self, arena: &mut FrameArena<T>, other: &mut DrawList<T>) {
        // Both segments may live in the same slab; stage through a
        // temporary rather than borrowing two ranges at once.
        let items: Vec<T> = other.as_slice(arena).to_vec();
        self.extend_from_slice(arena, &items);
        other.dispose(arena);
    }

    /// Remove the element at `index`, preserving the relative order of
    /// the remainder.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at_ordered(&mut self, arena: &mut FrameArena<T>, index: u32) {
        assert!(
            index < self.len,
            "remove_at_ordered index {index} out of range for list of {}",
            self.len
        );
        let segment = self.segment.expect("non-empty list has a segment");
        let items = arena.slice_mut(segment, self.len);
        items[index as usize..].rotate_left(1);
        self.len -= 1;
        // Clear the vacated tail slot so owning elements drop now.
        items[self.len as usize] = T::default();
    }

    /// Grow the list by `count` slots and return the new tail as a
    /// writable view.
    ///
    /// Slots hold `T::default()` until the caller overwrites them; they
    /// are counted in `len` immediately.
    pub fn reserve_tail<'a>(&mut self, arena: &'a mut FrameArena<T>, count: u32) -> &'a mut [T] {
        let new_len = self.len + count;
        self.ensure_capacity(arena, new_len);
        let segment = self.segment.expect("ensure_capacity issued a segment");
        let start = self.len as usize;
        self.len = new_len;
        &mut arena.slice_mut(segment, new_len)[start..]
    }

    /// Sort the list in place with the supplied comparer.
    ///
    /// Unstable: equal elements have no guaranteed relative order unless
    /// the comparer breaks ties itself.
    pub fn sort_by<F>(&mut self, arena: &mut FrameArena<T>, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        if let Some(segment) = self.segment {
            arena.slice_mut(segment, self.len).sort_unstable_by(compare);
        }
    }

    /// Shared view of the list's elements (empty if nothing was pushed).
    pub fn as_slice<'a>(&self, arena: &'a FrameArena<T>) -> &'a [T] {
        match self.segment {
            Some(segment) => arena.slice(segment, self.len),
            None => &[],
        }
    }

    /// Mutable view of the list's elements.
    pub fn as_mut_slice<'a>(&self, arena: &'a mut FrameArena<T>) -> &'a mut [T] {
        match self.segment {
            Some(segment) => arena.slice_mut(segment, self.len),
            None => &mut [],
        }
    }

    /// Shared reference to the element at `index`, if in range.
    pub fn get<'a>(&self, arena: &'a FrameArena<T>, index: u32) -> Option<&'a T> {
        if index < self.len {
            Some(&self.as_slice(arena)[index as usize])
        } else {
            None
        }
    }

    /// Mutable reference to the element at `index`, if in range.
    pub fn get_mut<'a>(&self, arena: &'a mut FrameArena<T>, index: u32) -> Option<&'a mut T> {
        if index < self.len {
            Some(&mut self.as_mut_slice(arena)[index as usize])
        } else {
            None
        }
    }

    /// Logically empty the list. Capacity is retained; element storage
    /// is reclaimed on [`dispose`](Self::dispose) or frame teardown.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Empty the list and return its segment to the originating slab.
    pub fn dispose(&mut self, arena: &mut FrameArena<T>) {
        if let Some(segment) = self.segment.take() {
            arena.free(segment);
        }
        self.len = 0;
    }

    fn ensure_capacity(&mut self, arena: &mut FrameArena<T>, min_capacity: u32) {
        match self.segment {
            None => {
                self.segment = Some(arena.allocate(min_capacity.max(INITIAL_CAPACITY)));
            }
            Some(segment) if segment.capacity() < min_capacity => {
                self.segment = Some(arena.grow(segment, self.len, min_capacity));
            }
            Some(_) => {}
        }
    }
}

impl<T: Clone + Default> Default for DrawList<T> {
    fn default() -> Self {
        Self::new()
    }
}
