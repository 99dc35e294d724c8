//! C-compatible header layout description.

use utlvec_core::layout::INT_WIDTH;
use utlvec_core::{FieldSpec, HeaderLayout};

/// Byte offsets of the foreign header's fields.
///
/// Pointer fields are `pointer_width` bytes wide and `int` fields are 4
/// bytes wide; only the offsets are configurable. `cached_base_offset` is
/// ignored when `has_cached_base` is 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UtlHeaderLayout {
    /// Size of a pointer in bytes (4 or 8). Must match the host.
    pub pointer_width: usize,
    /// Offset of the backing store pointer.
    pub base_offset: usize,
    /// Offset of the `int` allocation count.
    pub allocation_count_offset: usize,
    /// Offset of the `int` grow size hint.
    pub grow_size_offset: usize,
    /// Offset of the `int` element count.
    pub element_count_offset: usize,
    /// Nonzero if the header carries the cached base pointer.
    pub has_cached_base: u8,
    /// Offset of the cached base pointer.
    pub cached_base_offset: usize,
    /// Total header size in bytes.
    pub size: usize,
}

impl From<UtlHeaderLayout> for HeaderLayout {
    fn from(c: UtlHeaderLayout) -> Self {
        let pointer = |offset| FieldSpec::new(offset, c.pointer_width);
        let int = |offset| FieldSpec::new(offset, INT_WIDTH);
        HeaderLayout {
            pointer_width: c.pointer_width,
            base: pointer(c.base_offset),
            allocation_count: int(c.allocation_count_offset),
            grow_size: int(c.grow_size_offset),
            element_count: int(c.element_count_offset),
            cached_base: (c.has_cached_base != 0).then(|| pointer(c.cached_base_offset)),
            size: c.size,
        }
    }
}

impl From<&HeaderLayout> for UtlHeaderLayout {
    fn from(layout: &HeaderLayout) -> Self {
        Self {
            pointer_width: layout.pointer_width,
            base_offset: layout.base.offset,
            allocation_count_offset: layout.allocation_count.offset,
            grow_size_offset: layout.grow_size.offset,
            element_count_offset: layout.element_count.offset,
            has_cached_base: u8::from(layout.has_cached_base()),
            cached_base_offset: layout.cached_base.map_or(0, |f| f.offset),
            size: layout.size,
        }
    }
}
