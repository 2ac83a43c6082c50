//! Arena configuration parameters.

/// Configuration for a per-frame arena.
///
/// Controls slab sizing and list growth. Immutable after construction;
/// every arena in a frame's slab cache shares one config.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Target size of a freshly allocated slab, in bytes.
    ///
    /// Default: 1 MiB. A slab created to satisfy a request larger than
    /// this gets exactly the requested capacity instead.
    pub ideal_slab_bytes: usize,

    /// Minimum number of elements per slab, regardless of element size.
    ///
    /// Default: 256. Prevents tiny slabs for large element types.
    pub min_slab_items: u32,

    /// Cap on the growth increment when a list reallocates, in elements.
    ///
    /// Growth at least doubles a list's capacity but never adds more
    /// than this many elements in one step, to avoid pathological
    /// over-allocation for very large lists. Default: 16384.
    pub max_growth_step: u32,
}

impl ArenaConfig {
    /// Default slab size: 1 MiB.
    pub const DEFAULT_IDEAL_SLAB_BYTES: usize = 1024 * 1024;

    /// Default minimum item count per slab.
    pub const DEFAULT_MIN_SLAB_ITEMS: u32 = 256;

    /// Default growth increment cap.
    pub const DEFAULT_MAX_GROWTH_STEP: u32 = 16_384;

    /// Ideal slab capacity in elements for an element of `item_size` bytes.
    ///
    /// Never less than [`min_slab_items`](Self::min_slab_items).
    pub fn ideal_slab_items(&self, item_size: usize) -> u32 {
        let per_slab = self.ideal_slab_bytes / item_size.max(1);
        (per_slab as u32).max(self.min_slab_items)
    }

    /// New capacity for a list growing from `old_capacity` to hold at
    /// least `min_capacity` elements.
    ///
    /// At least double the old capacity, bounded below by the request,
    /// with the increment capped by [`max_growth_step`](Self::max_growth_step).
    pub fn growth_target(&self, old_capacity: u32, min_capacity: u32) -> u32 {
        let doubled = old_capacity.saturating_mul(2);
        let capped = doubled.min(old_capacity.saturating_add(self.max_growth_step));
        capped.max(min_capacity)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            ideal_slab_bytes: Self::DEFAULT_IDEAL_SLAB_BYTES,
            min_slab_items: Self::DEFAULT_MIN_SLAB_ITEMS,
            max_growth_step: Self::DEFAULT_MAX_GROWTH_STEP,
        }
    }
}
