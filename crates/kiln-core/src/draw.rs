//! The draw-call payload stored in arena-backed lists.

use crate::id::TextureId;

/// A single draw call: one textured index range plus an ordering key.
///
/// This is deliberately a plain-old-data struct. The core shuffles draw
/// calls between arena segments, sorts them, and hands them off to the
/// encoding layer; it never interprets them. Kept `Copy` so list growth
/// is a flat memcpy-equivalent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawCall {
    /// Texture bound for this draw.
    pub texture: TextureId,
    /// First index in the shared index buffer.
    pub first_index: u32,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Within-batch ordering key. Lists are sorted by this before encoding;
    /// equal keys have no guaranteed relative order.
    pub sort_key: i32,
}

impl DrawCall {
    /// Create a draw call with a zero sort key.
    pub fn new(texture: TextureId, first_index: u32, index_count: u32) -> Self {
        Self {
            texture,
            first_index,
            index_count,
            sort_key: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zeroed() {
        let dc = DrawCall::default();
        assert_eq!(dc.texture, TextureId(0));
        assert_eq!(dc.index_count, 0);
        assert_eq!(dc.sort_key, 0);
    }

    #[test]
    fn new_sets_range() {
        let dc = DrawCall::new(TextureId(2), 6, 12);
        assert_eq!(dc.first_index, 6);
        assert_eq!(dc.index_count, 12);
    }
}
