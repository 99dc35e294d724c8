//! Typed accessors over the foreign vector header.
//!
//! [`ForeignHeader`] pairs a foreign address with a validated
//! [`HeaderLayout`] and reads or writes each field at its byte offset.
//! It never owns the header memory.

#![allow(unsafe_code)]

use std::ptr::{self, NonNull};

use utlvec_core::{BufferError, HeaderLayout};

use crate::raw;

/// Snapshot of the header's fields, checked against the count invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderState {
    /// Backing store pointer (null iff `allocation == 0`).
    pub base: *mut u8,
    /// Allocation count.
    pub allocation: usize,
    /// Live element count (`<= allocation`).
    pub count: usize,
    /// Raw grow size hint; only checked when a growth needs it.
    pub grow_size: i32,
}

/// Accessor for a vector header that lives at a foreign address.
#[derive(Debug)]
pub struct ForeignHeader {
    addr: NonNull<u8>,
    layout: HeaderLayout,
}

// SAFETY: the header is only touched through `&self`/`&mut self` of the
// owning buffer; callers provide single-writer discipline for the foreign
// memory, so moving the accessor to another thread is sound.
unsafe impl Send for ForeignHeader {}

impl ForeignHeader {
    /// Wrap a foreign header.
    ///
    /// # Safety
    ///
    /// `addr` must point to at least `layout.size` bytes that stay valid
    /// for reads and writes for the lifetime of the returned value, and
    /// `layout` must have passed [`HeaderLayout::validate`].
    pub unsafe fn new(addr: NonNull<u8>, layout: HeaderLayout) -> Self {
        Self { addr, layout }
    }

    /// The foreign address.
    pub fn addr(&self) -> NonNull<u8> {
        self.addr
    }

    /// The layout used to access the header.
    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Backing store pointer.
    pub fn base(&self) -> *mut u8 {
        // SAFETY: field lies inside the header per constructor contract.
        unsafe { raw::read_ptr(self.addr, self.layout.base) }
    }

    /// Allocation count as stored.
    pub fn allocation_count(&self) -> i32 {
        // SAFETY: as above.
        unsafe { raw::read_int(self.addr, self.layout.allocation_count) }
    }

    /// Grow size hint as stored.
    pub fn grow_size(&self) -> i32 {
        // SAFETY: as above.
        unsafe { raw::read_int(self.addr, self.layout.grow_size) }
    }

    /// Element count as stored.
    pub fn element_count(&self) -> i32 {
        // SAFETY: as above.
        unsafe { raw::read_int(self.addr, self.layout.element_count) }
    }

    /// Cached base pointer, or `None` if the layout has no such field.
    pub fn cached_base(&self) -> Option<*mut u8> {
        self.layout
            .cached_base
            // SAFETY: as above.
            .map(|spec| unsafe { raw::read_ptr(self.addr, spec) })
    }

    pub(crate) fn set_base(&mut self, base: *mut u8) {
        // SAFETY: as above.
        unsafe { raw::write_ptr(self.addr, self.layout.base, base) }
    }

    pub(crate) fn set_allocation_count(&mut self, count: i32) {
        // SAFETY: as above.
        unsafe { raw::write_int(self.addr, self.layout.allocation_count, count) }
    }

    pub(crate) fn set_grow_size(&mut self, hint: i32) {
        // SAFETY: as above.
        unsafe { raw::write_int(self.addr, self.layout.grow_size, hint) }
    }

    pub(crate) fn set_element_count(&mut self, count: i32) {
        // SAFETY: as above.
        unsafe { raw::write_int(self.addr, self.layout.element_count, count) }
    }

    /// Copy the base pointer into the cached field, if present.
    pub(crate) fn sync_cached_base(&mut self) {
        if let Some(spec) = self.layout.cached_base {
            let base = self.base();
            // SAFETY: as above.
            unsafe { raw::write_ptr(self.addr, spec, base) }
        }
    }

    /// Read all fields and check the count invariants.
    pub fn state(&self) -> Result<HeaderState, BufferError> {
        let base = self.base();
        let allocation = self.allocation_count();
        let count = self.element_count();
        let grow_size = self.grow_size();

        let allocation = usize::try_from(allocation).map_err(|_| BufferError::CorruptHeader {
            reason: format!("negative allocation count {allocation}"),
        })?;
        let count = usize::try_from(count).map_err(|_| BufferError::CorruptHeader {
            reason: format!("negative element count {count}"),
        })?;
        if count > allocation {
            return Err(BufferError::CorruptHeader {
                reason: format!("element count {count} exceeds allocation count {allocation}"),
            });
        }
        if base.is_null() != (allocation == 0) {
            return Err(BufferError::CorruptHeader {
                reason: format!(
                    "base pointer {base:p} inconsistent with allocation count {allocation}"
                ),
            });
        }
        Ok(HeaderState {
            base,
            allocation,
            count,
            grow_size,
        })
    }

    /// Reset to the empty state: null base, zero allocation and count.
    pub(crate) fn clear(&mut self) {
        self.set_base(ptr::null_mut());
        self.set_allocation_count(0);
        self.set_element_count(0);
        self.sync_cached_base();
    }
}
