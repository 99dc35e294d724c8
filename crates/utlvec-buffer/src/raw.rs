//! Low-level primitives for foreign header and backing store access.
//!
//! Every `unsafe` operation in the engine goes through one of these
//! functions. Header fields are accessed with unaligned reads and writes
//! so a foreign address with unexpected alignment is still handled
//! correctly; byte ranges use `ptr::copy` / `ptr::copy_nonoverlapping`.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use utlvec_core::FieldSpec;

/// Read a pointer-width field.
///
/// # Safety
///
/// `header + spec.offset .. header + spec.end()` must be readable and
/// `spec.width` must equal the host pointer width.
pub(crate) unsafe fn read_ptr(header: NonNull<u8>, spec: FieldSpec) -> *mut u8 {
    debug_assert_eq!(spec.width, std::mem::size_of::<*mut u8>());
    // SAFETY: caller guarantees the field lies inside the header.
    unsafe { ptr::read_unaligned(header.as_ptr().add(spec.offset).cast::<*mut u8>()) }
}

/// Write a pointer-width field.
///
/// # Safety
///
/// Same as [`read_ptr`], and the field must be writable.
pub(crate) unsafe fn write_ptr(header: NonNull<u8>, spec: FieldSpec, value: *mut u8) {
    debug_assert_eq!(spec.width, std::mem::size_of::<*mut u8>());
    // SAFETY: caller guarantees the field lies inside the header.
    unsafe { ptr::write_unaligned(header.as_ptr().add(spec.offset).cast::<*mut u8>(), value) }
}

/// Read a 4-byte `int` field.
///
/// # Safety
///
/// `header + spec.offset .. header + spec.end()` must be readable.
pub(crate) unsafe fn read_int(header: NonNull<u8>, spec: FieldSpec) -> i32 {
    debug_assert_eq!(spec.width, 4);
    // SAFETY: caller guarantees the field lies inside the header.
    unsafe { ptr::read_unaligned(header.as_ptr().add(spec.offset).cast::<i32>()) }
}

/// Write a 4-byte `int` field.
///
/// # Safety
///
/// Same as [`read_int`], and the field must be writable.
pub(crate) unsafe fn write_int(header: NonNull<u8>, spec: FieldSpec, value: i32) {
    debug_assert_eq!(spec.width, 4);
    // SAFETY: caller guarantees the field lies inside the header.
    unsafe { ptr::write_unaligned(header.as_ptr().add(spec.offset).cast::<i32>(), value) }
}

/// Allocate an uninitialised block. `None` if the allocator fails.
///
/// # Safety
///
/// `layout.size()` must be nonzero.
pub(crate) unsafe fn alloc_block(layout: Layout) -> Option<NonNull<u8>> {
    debug_assert!(layout.size() > 0);
    // SAFETY: nonzero size per caller contract.
    NonNull::new(unsafe { alloc::alloc(layout) })
}

/// Free a block from [`alloc_block`].
///
/// # Safety
///
/// `block` must have come from `alloc_block(layout)` and not been freed.
pub(crate) unsafe fn dealloc_block(block: NonNull<u8>, layout: Layout) {
    // SAFETY: forwarded caller contract.
    unsafe { alloc::dealloc(block.as_ptr(), layout) }
}

/// Copy `len` bytes between non-overlapping ranges.
///
/// # Safety
///
/// Both ranges must be valid for `len` bytes and must not overlap.
pub(crate) unsafe fn copy_bytes(src: *const u8, dst: *mut u8, len: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { ptr::copy_nonoverlapping(src, dst, len) }
}

/// Move `len` bytes; the ranges may overlap.
///
/// # Safety
///
/// Both ranges must be valid for `len` bytes.
pub(crate) unsafe fn move_bytes(src: *const u8, dst: *mut u8, len: usize) {
    // SAFETY: forwarded caller contract.
    unsafe { ptr::copy(src, dst, len) }
}

/// View `len` bytes at `ptr`. A zero length never touches `ptr`.
///
/// # Safety
///
/// For nonzero `len`, `ptr` must be valid for reads of `len` bytes for
/// `'a`, with no concurrent writes.
pub(crate) unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if len == 0 {
        return &[];
    }
    // SAFETY: forwarded caller contract; ptr is non-null for nonzero len.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// Mutable view of `len` bytes at `ptr`. A zero length never touches `ptr`.
///
/// # Safety
///
/// For nonzero `len`, `ptr` must be valid for reads and writes of `len`
/// bytes for `'a`, with no other live reference to the range.
pub(crate) unsafe fn bytes_mut<'a>(ptr: *mut u8, len: usize) -> &'a mut [u8] {
    if len == 0 {
        return &mut [];
    }
    // SAFETY: forwarded caller contract; ptr is non-null for nonzero len.
    unsafe { std::slice::from_raw_parts_mut(ptr, len) }
}
