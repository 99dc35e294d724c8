//! Test utilities for utlvec development.
//!
//! Provides [`HeaderFixture`], a zeroed, pointer-aligned block standing in
//! for a header owned by a foreign process, plus `repr(C)` mirrors of the
//! native header in [`fixtures`] for cross-checking layout offsets.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{ForeignStore, NativeMemory, NativeVector, NativeVectorUncached};

use std::cell::UnsafeCell;
use std::ptr;

use utlvec_core::{FieldSpec, HeaderLayout};

/// Capacity of a fixture in 8-byte words. Large enough for any valid layout.
const FIXTURE_WORDS: usize = 8;

/// A zeroed header block at a stable heap address.
///
/// The engine under test gets [`as_ptr`](HeaderFixture::as_ptr); the test
/// inspects or seeds fields through the typed getters and setters, which
/// read and write at the layout's offsets.
pub struct HeaderFixture {
    words: Box<UnsafeCell<[u64; FIXTURE_WORDS]>>,
    layout: HeaderLayout,
}

impl HeaderFixture {
    pub fn new(layout: HeaderLayout) -> Self {
        assert!(
            layout.size <= FIXTURE_WORDS * 8,
            "layout size {} exceeds fixture capacity",
            layout.size
        );
        Self {
            words: Box::new(UnsafeCell::new([0; FIXTURE_WORDS])),
            layout,
        }
    }

    pub fn native() -> Self {
        Self::new(HeaderLayout::native())
    }

    pub fn native_uncached() -> Self {
        Self::new(HeaderLayout::native_uncached())
    }

    /// Native header with a preset grow size hint.
    pub fn with_grow_size(hint: i32) -> Self {
        let fixture = Self::native();
        fixture.set_grow_size(hint);
        fixture
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Address to hand to the engine.
    pub fn as_ptr(&self) -> *mut u8 {
        self.words.get().cast()
    }

    pub fn base(&self) -> *mut u8 {
        self.read_ptr(self.layout.base)
    }

    pub fn set_base(&self, base: *mut u8) {
        self.write_ptr(self.layout.base, base);
    }

    pub fn allocation_count(&self) -> i32 {
        self.read_int(self.layout.allocation_count)
    }

    pub fn set_allocation_count(&self, value: i32) {
        self.write_int(self.layout.allocation_count, value);
    }

    pub fn grow_size(&self) -> i32 {
        self.read_int(self.layout.grow_size)
    }

    pub fn set_grow_size(&self, value: i32) {
        self.write_int(self.layout.grow_size, value);
    }

    pub fn element_count(&self) -> i32 {
        self.read_int(self.layout.element_count)
    }

    pub fn set_element_count(&self, value: i32) {
        self.write_int(self.layout.element_count, value);
    }

    pub fn cached_base(&self) -> Option<*mut u8> {
        self.layout.cached_base.map(|spec| self.read_ptr(spec))
    }

    pub fn set_cached_base(&self, base: *mut u8) {
        if let Some(spec) = self.layout.cached_base {
            self.write_ptr(spec, base);
        }
    }

    /// Point the header at a store the fixture's caller owns.
    pub fn adopt(&self, store: &mut ForeignStore, count: i32) {
        self.set_base(store.as_mut_ptr());
        self.set_allocation_count(store.capacity() as i32);
        self.set_element_count(count);
        self.set_cached_base(store.as_mut_ptr());
    }

    /// Raw header bytes, for asserting that a failed call wrote nothing.
    pub fn snapshot(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.layout.size];
        self.copy_out(&mut out);
        out
    }

    #[allow(unsafe_code)]
    fn copy_out(&self, out: &mut [u8]) {
        // SAFETY: out.len() == layout.size <= fixture capacity.
        unsafe { ptr::copy_nonoverlapping(self.as_ptr(), out.as_mut_ptr(), out.len()) }
    }

    #[allow(unsafe_code)]
    fn read_ptr(&self, spec: FieldSpec) -> *mut u8 {
        // SAFETY: spec lies inside the fixture (checked in `new`).
        unsafe { ptr::read_unaligned(self.as_ptr().add(spec.offset).cast::<*mut u8>()) }
    }

    #[allow(unsafe_code)]
    fn write_ptr(&self, spec: FieldSpec, value: *mut u8) {
        // SAFETY: as above; UnsafeCell permits writes through `&self`.
        unsafe { ptr::write_unaligned(self.as_ptr().add(spec.offset).cast::<*mut u8>(), value) }
    }

    #[allow(unsafe_code)]
    fn read_int(&self, spec: FieldSpec) -> i32 {
        // SAFETY: as above.
        unsafe { ptr::read_unaligned(self.as_ptr().add(spec.offset).cast::<i32>()) }
    }

    #[allow(unsafe_code)]
    fn write_int(&self, spec: FieldSpec, value: i32) {
        // SAFETY: as above.
        unsafe { ptr::write_unaligned(self.as_ptr().add(spec.offset).cast::<i32>(), value) }
    }
}

/// Encode a 4-byte cell as element bytes in native byte order.
pub fn cell(value: i32) -> [u8; 4] {
    value.to_ne_bytes()
}

/// Decode a buffer's live bytes as a sequence of 4-byte cells.
pub fn cells(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
