//! The in-place growable buffer engine.
//!
//! [`RawGrowableBuffer`] overlays a foreign vector header and implements
//! element access, append, search and removal directly on the header's
//! fields. The header memory is borrowed; the engine owns only the backing
//! stores it allocates while growing.
//!
//! Every mutating operation reads and checks the header first, performs
//! anything that can fail, and only then writes header fields. A failed
//! call leaves the header exactly as it found it.

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;
use std::slice::ChunksExact;

use utlvec_core::{grow_i32, BufferError, HeaderLayout};

use crate::config::{BufferConfig, ReleasePolicy};
use crate::header::{ForeignHeader, HeaderState};
use crate::lifecycle::{ElementLifecycle, PodLifecycle};
use crate::raw;
use crate::store::OwnedStore;

/// Growable array whose header lives at a foreign address.
///
/// The element size (stride) is fixed at construction. Elements are
/// opaque byte blobs; construction and destruction go through the
/// [`ElementLifecycle`] policy `L`.
///
/// After every mutating call the header satisfies:
///
/// - `0 <= count <= allocation`
/// - `base` is null iff `allocation == 0`
/// - the cached base pointer (when the layout has one) equals `base`
pub struct RawGrowableBuffer<L: ElementLifecycle = PodLifecycle> {
    header: ForeignHeader,
    element_size: usize,
    /// The backing store this buffer allocated, if it has grown.
    owned: Option<OwnedStore>,
    config: BufferConfig,
    lifecycle: L,
}

impl RawGrowableBuffer {
    /// Overlay the header at `addr` with the native layout and default
    /// limits.
    ///
    /// # Safety
    ///
    /// See [`with_lifecycle`](RawGrowableBuffer::with_lifecycle).
    pub unsafe fn from_raw(addr: *mut u8, element_size: usize) -> Result<Self, BufferError> {
        // SAFETY: forwarded caller contract.
        unsafe { Self::with_config(addr, element_size, BufferConfig::default()) }
    }

    /// Overlay the header at `addr` with an explicit configuration.
    ///
    /// # Safety
    ///
    /// See [`with_lifecycle`](RawGrowableBuffer::with_lifecycle).
    pub unsafe fn with_config(
        addr: *mut u8,
        element_size: usize,
        config: BufferConfig,
    ) -> Result<Self, BufferError> {
        // SAFETY: forwarded caller contract.
        unsafe { Self::with_lifecycle(addr, element_size, config, PodLifecycle) }
    }
}

impl<L: ElementLifecycle> RawGrowableBuffer<L> {
    /// Overlay the header at `addr`.
    ///
    /// Fails with [`BufferError::NullAddress`] for a null `addr`,
    /// [`BufferError::InvalidElementSize`] for a zero or oversized
    /// `element_size`, and [`BufferError::CorruptHeader`] when the header
    /// already violates its invariants.
    ///
    /// # Safety
    ///
    /// If `addr` is non-null it must point to `config.layout.size` bytes
    /// laid out as described by `config.layout`, valid for reads and
    /// writes until the buffer is dropped. A non-null base pointer in the
    /// header must reference at least `allocation_count * element_size`
    /// valid bytes. Nothing else may access the header or store while the
    /// buffer is in use.
    pub unsafe fn with_lifecycle(
        addr: *mut u8,
        element_size: usize,
        config: BufferConfig,
        lifecycle: L,
    ) -> Result<Self, BufferError> {
        config.validate()?;
        let addr = NonNull::new(addr).ok_or(BufferError::NullAddress)?;
        config.check_element_size(element_size)?;
        // SAFETY: addr covers the layout per caller contract; the layout
        // was validated above.
        let header = unsafe { ForeignHeader::new(addr, config.layout) };
        header.state()?;
        Ok(Self {
            header,
            element_size,
            owned: None,
            config,
            lifecycle,
        })
    }

    /// Fixed size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Address of the foreign header.
    pub fn header_address(&self) -> NonNull<u8> {
        self.header.addr()
    }

    /// The header accessor, for diagnostics.
    pub fn header(&self) -> &ForeignHeader {
        &self.header
    }

    /// Header layout in use.
    pub fn layout(&self) -> &HeaderLayout {
        self.header.layout()
    }

    /// Configuration the buffer was created with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Number of live elements. A negative stored count reads as zero.
    pub fn count(&self) -> usize {
        usize::try_from(self.header.element_count()).unwrap_or(0)
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether `index` names a live element. Never mutates.
    ///
    /// False for every index while the header is inconsistent, matching
    /// what [`element_at`](RawGrowableBuffer::element_at) accepts.
    pub fn is_valid_index(&self, index: usize) -> bool {
        self.header.state().is_ok_and(|state| index < state.count)
    }

    /// Number of elements the current backing store can hold.
    pub fn allocation_count(&self) -> usize {
        usize::try_from(self.header.allocation_count()).unwrap_or(0)
    }

    /// Grow size hint as stored in the header.
    pub fn grow_size_hint(&self) -> i32 {
        self.header.grow_size()
    }

    /// Set the grow size hint (0 selects the doubling policy).
    pub fn set_grow_size_hint(&mut self, hint: usize) -> Result<(), BufferError> {
        let hint =
            i32::try_from(hint).map_err(|_| BufferError::CapacityOverflow { requested: hint })?;
        self.header.set_grow_size(hint);
        Ok(())
    }

    /// Backing store address; null while the allocation is empty.
    pub fn base(&self) -> *mut u8 {
        self.header.base()
    }

    /// Cached base pointer, or `None` if the layout has no such field.
    pub fn cached_base(&self) -> Option<*mut u8> {
        self.header.cached_base()
    }

    /// Whether the current backing store was allocated by this buffer.
    pub fn owns_store(&self) -> bool {
        self.owned
            .as_ref()
            .is_some_and(|store| store.as_ptr() == self.base())
    }

    /// Address of element `index`.
    pub fn element_at(&self, index: usize) -> Result<NonNull<u8>, BufferError> {
        let state = self.checked_index(index)?;
        NonNull::new(self.slot(&state, index)).ok_or_else(|| BufferError::CorruptHeader {
            reason: "null base pointer with live elements".into(),
        })
    }

    /// Bytes of element `index`.
    pub fn element(&self, index: usize) -> Result<&[u8], BufferError> {
        let slot = self.element_at(index)?;
        // SAFETY: the slot is inside the live prefix of the store.
        Ok(unsafe { raw::bytes(slot.as_ptr(), self.element_size) })
    }

    /// Mutable bytes of element `index`.
    pub fn element_mut(&mut self, index: usize) -> Result<&mut [u8], BufferError> {
        let slot = self.element_at(index)?;
        // SAFETY: the slot is inside the live prefix and `&mut self`
        // guarantees no other view exists.
        Ok(unsafe { raw::bytes_mut(slot.as_ptr(), self.element_size) })
    }

    /// The live prefix of the store, `count * element_size` bytes.
    pub fn as_bytes(&self) -> Result<&[u8], BufferError> {
        let state = self.header.state()?;
        // SAFETY: the live prefix is valid per the header invariants.
        Ok(unsafe { raw::bytes(state.base, state.count * self.element_size) })
    }

    /// Iterate over live elements.
    pub fn iter(&self) -> Result<ChunksExact<'_, u8>, BufferError> {
        Ok(self.as_bytes()?.chunks_exact(self.element_size))
    }

    /// Overwrite element `index` with `src`.
    pub fn set(&mut self, index: usize, src: &[u8]) -> Result<(), BufferError> {
        self.check_len(src)?;
        let state = self.checked_index(index)?;
        // SAFETY: live slot, exclusively borrowed through `&mut self`.
        let slot = unsafe { raw::bytes_mut(self.slot(&state, index), self.element_size) };
        self.lifecycle.destruct(slot);
        self.lifecycle.construct(slot, Some(src));
        Ok(())
    }

    /// Append one element, copied from `src` or zero-filled when `None`.
    ///
    /// Returns the new element's index (the count before the call).
    pub fn append(&mut self, src: Option<&[u8]>) -> Result<usize, BufferError> {
        if let Some(src) = src {
            self.check_len(src)?;
        }
        let state = self.grow_vector(1)?;
        let index = state.count - 1;
        // SAFETY: grow_vector made `index` a slot inside the allocation.
        let slot = unsafe { raw::bytes_mut(self.slot(&state, index), self.element_size) };
        self.lifecycle.construct(slot, src);
        Ok(index)
    }

    /// Index of the first element byte-equal to `needle`.
    pub fn find(&self, needle: &[u8]) -> Result<Option<usize>, BufferError> {
        self.check_len(needle)?;
        Ok(self.iter()?.position(|elem| elem == needle))
    }

    /// Remove element `index`, shifting later elements down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<(), BufferError> {
        let state = self.checked_index(index)?;
        // SAFETY: live slot, exclusively borrowed through `&mut self`.
        let slot = unsafe { raw::bytes_mut(self.slot(&state, index), self.element_size) };
        self.lifecycle.destruct(slot);
        self.shift_left(&state, index, 1);
        self.header.set_element_count((state.count - 1) as i32);
        self.header.sync_cached_base();
        Ok(())
    }

    /// Destruct every element, last to first, and set the count to zero.
    ///
    /// The backing store is kept; the allocation count does not change.
    pub fn remove_all(&mut self) -> Result<(), BufferError> {
        let state = self.header.state()?;
        self.destruct_all(&state);
        self.header.set_element_count(0);
        self.header.sync_cached_base();
        Ok(())
    }

    /// Release the buffer. Equivalent to dropping it.
    ///
    /// With [`ReleasePolicy::FreeOwned`] an owned backing store is freed
    /// and the header is reset to empty; with [`ReleasePolicy::Detach`]
    /// both are left for the foreign side.
    pub fn release(self) {
        drop(self);
    }

    fn check_len(&self, bytes: &[u8]) -> Result<(), BufferError> {
        if bytes.len() != self.element_size {
            return Err(BufferError::ElementSizeMismatch {
                expected: self.element_size,
                actual: bytes.len(),
            });
        }
        Ok(())
    }

    fn checked_index(&self, index: usize) -> Result<HeaderState, BufferError> {
        let state = self.header.state()?;
        if index >= state.count {
            return Err(BufferError::IndexOutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                count: state.count,
            });
        }
        Ok(state)
    }

    /// Address of slot `index`; only dereferenced for `index < allocation`.
    fn slot(&self, state: &HeaderState, index: usize) -> *mut u8 {
        state.base.wrapping_add(index * self.element_size)
    }

    fn destruct_all(&self, state: &HeaderState) {
        for index in (0..state.count).rev() {
            // SAFETY: every index below count is a live slot.
            let slot = unsafe { raw::bytes_mut(self.slot(state, index), self.element_size) };
            self.lifecycle.destruct(slot);
        }
    }

    /// Move elements `[elem + num, count)` down to start at `elem`.
    fn shift_left(&mut self, state: &HeaderState, elem: usize, num: usize) {
        let to_move = state.count.saturating_sub(elem + num);
        if to_move > 0 && num > 0 {
            // SAFETY: both ranges lie inside the live prefix; move_bytes
            // tolerates the overlap.
            unsafe {
                raw::move_bytes(
                    self.slot(state, elem + num),
                    self.slot(state, elem),
                    to_move * self.element_size,
                )
            }
        }
    }

    /// Make room for `num` more elements and add them to the count.
    ///
    /// Returns the header state after the growth.
    fn grow_vector(&mut self, num: usize) -> Result<HeaderState, BufferError> {
        let mut state = self.header.state()?;
        let total = state.count.saturating_add(num);
        let requested =
            i32::try_from(total).map_err(|_| BufferError::CapacityOverflow { requested: total })?;

        if total > state.allocation {
            if state.grow_size < 0 {
                return Err(BufferError::CorruptHeader {
                    reason: format!("negative grow size {}", state.grow_size),
                });
            }
            let allocation = grow_i32(
                self.header.allocation_count(),
                state.grow_size,
                requested,
                self.element_size,
            )
            .ok_or(BufferError::CapacityOverflow { requested: total })?;
            // grow_i32 never returns less than `requested`, which is >= 0.
            let allocation = allocation as usize;
            self.reallocate(&state, allocation)?;
            state.base = self.header.base();
            state.allocation = allocation;
        }

        self.header.set_element_count(requested);
        self.header.sync_cached_base();
        state.count = total;
        Ok(state)
    }

    /// Move the live elements into a new store of `allocation` elements.
    fn reallocate(&mut self, state: &HeaderState, allocation: usize) -> Result<(), BufferError> {
        let bytes = allocation
            .checked_mul(self.element_size)
            .ok_or(BufferError::CapacityOverflow {
                requested: allocation,
            })?;
        let store = OwnedStore::allocate(bytes, self.config.store_align)?;

        let live = state.count * self.element_size;
        if live > 0 {
            // SAFETY: the old store holds `live` bytes of elements and the
            // fresh block is at least that large.
            unsafe { raw::copy_bytes(state.base, store.as_ptr(), live) };
        }

        self.header.set_base(store.as_ptr());
        self.header.set_allocation_count(allocation as i32);
        self.header.sync_cached_base();
        // Frees the previous owned store; a foreign store is never freed.
        self.owned = Some(store);
        Ok(())
    }
}

impl<L: ElementLifecycle> Drop for RawGrowableBuffer<L> {
    fn drop(&mut self) {
        let Some(store) = self.owned.take() else {
            return;
        };
        match self.config.release {
            ReleasePolicy::Detach => {
                store.leak();
            }
            ReleasePolicy::FreeOwned => {
                if self.header.base() == store.as_ptr() {
                    if let Ok(state) = self.header.state() {
                        self.destruct_all(&state);
                    }
                    self.header.clear();
                }
            }
        }
    }
}

impl<L: ElementLifecycle> fmt::Debug for RawGrowableBuffer<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawGrowableBuffer")
            .field("header", &self.header.addr())
            .field("element_size", &self.element_size)
            .field("count", &self.header.element_count())
            .field("allocation_count", &self.header.allocation_count())
            .field("owns_store", &self.owns_store())
            .finish()
    }
}
