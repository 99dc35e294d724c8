//! Backing store allocations owned by the engine.
//!
//! An [`OwnedStore`] is freed when dropped. Growth builds the replacement
//! store first and only drops the old one after the header points at the
//! new block, so a failed allocation leaves the vector untouched.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use utlvec_core::BufferError;

use crate::raw;

/// A heap block allocated for element storage.
#[derive(Debug)]
pub(crate) struct OwnedStore {
    block: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the store is uniquely owned heap memory.
unsafe impl Send for OwnedStore {}

impl OwnedStore {
    /// Allocate `bytes` bytes aligned to `align`.
    ///
    /// `bytes` must be nonzero; the engine never asks for an empty store.
    pub(crate) fn allocate(bytes: usize, align: usize) -> Result<Self, BufferError> {
        let layout = Layout::from_size_align(bytes, align)
            .map_err(|_| BufferError::AllocationFailed { bytes })?;
        if layout.size() == 0 {
            return Err(BufferError::AllocationFailed { bytes });
        }
        // SAFETY: size checked nonzero above.
        let block = unsafe { raw::alloc_block(layout) }
            .ok_or(BufferError::AllocationFailed { bytes })?;
        Ok(Self { block, layout })
    }

    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.block.as_ptr()
    }

    pub(crate) fn size(&self) -> usize {
        self.layout.size()
    }

    /// Give up ownership without freeing the block.
    pub(crate) fn leak(self) -> *mut u8 {
        let block = self.block.as_ptr();
        std::mem::forget(self);
        block
    }
}

impl Drop for OwnedStore {
    fn drop(&mut self) {
        // SAFETY: block came from alloc_block(self.layout) and is freed once.
        unsafe { raw::dealloc_block(self.block, self.layout) }
    }
}
