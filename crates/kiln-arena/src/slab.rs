//! Contiguous typed storage slabs with bump allocation and a
//! same-frame free list.

use smallvec::SmallVec;

/// A range returned to the slab for reuse within the current frame.
#[derive(Clone, Copy, Debug)]
struct FreeRange {
    offset: u32,
    capacity: u32,
}

/// A single contiguous storage slab for one element type.
///
/// Storage is a pre-allocated `Vec<T>` filled with `T::default()`. A
/// cursor advances on each allocation; ranges freed within the same
/// frame go on a free list and are handed out again first-fit. Slabs
/// are never shrunk during a frame — only reset at frame boundaries or
/// dropped at shutdown.
pub struct Slab<T> {
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<T>,
    /// Bump pointer: next never-allocated position.
    used: usize,
    /// Ranges freed this frame, available for reuse.
    free: SmallVec<[FreeRange; 4]>,
}

impl<T: Clone + Default> Slab<T> {
    /// Create a new slab with the given capacity in elements.
    pub fn new(capacity: u32) -> Self {
        Self {
            data: vec![T::default(); capacity as usize],
            used: 0,
            free: SmallVec::new(),
        }
    }

    /// Allocate a range of at least `count` elements.
    ///
    /// The free list is scanned first (first fit; the whole freed range
    /// is handed back, so its capacity may exceed `count`). Falls back
    /// to bump allocation. Returns `(offset, capacity)` or `None` if
    /// there is insufficient contiguous space.
    pub fn try_allocate(&mut self, count: u32) -> Option<(u32, u32)> {
        if let Some(idx) = self.free.iter().position(|r| r.capacity >= count) {
            let range = self.free.remove(idx);
            return Some((range.offset, range.capacity));
        }

        let count = count as usize;
        let new_used = self.used.checked_add(count)?;
        if new_used > self.data.len() {
            return None;
        }
        let offset = self.used as u32;
        self.used = new_used;
        Some((offset, count as u32))
    }

    /// Return a range to the free list for same-frame reuse.
    ///
    /// The range is overwritten with `T::default()` first, so element
    /// types holding owning references drop them here rather than at
    /// frame teardown.
    ///
    /// # Panics
    ///
    /// Panics if the range lies outside the allocated region.
    pub fn free(&mut self, offset: u32, capacity: u32) {
        let start = offset as usize;
        let end = start + capacity as usize;
        assert!(
            end <= self.used,
            "freed range {start}..{end} exceeds allocated region 0..{}",
            self.used
        );
        self.data[start..end].fill(T::default());
        self.free.push(FreeRange { offset, capacity });
    }

    /// Get a shared slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the slab's storage.
    pub fn slice(&self, offset: u32, len: u32) -> &[T] {
        let start = offset as usize;
        let end = start + len as usize;
        &self.data[start..end]
    }

    /// Get a mutable slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the slab's storage.
    pub fn slice_mut(&mut self, offset: u32, len: u32) -> &mut [T] {
        let start = offset as usize;
        let end = start + len as usize;
        &mut self.data[start..end]
    }

    /// Clear all used storage and reset the cursor and free list.
    ///
    /// Storage is retained for reuse by the next frame; contents are
    /// overwritten with `T::default()` so no data aliases across frames.
    pub fn reset(&mut self) {
        self.data[..self.used].fill(T::default());
        self.used = 0;
        self.free.clear();
    }

    /// Remaining never-allocated capacity in elements.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.used
    }

    /// Total capacity in elements.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<T>()
    }
}
