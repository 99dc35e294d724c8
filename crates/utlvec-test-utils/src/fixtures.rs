//! `repr(C)` header mirrors and foreign-owned stores.
//!
//! - [`NativeVector`] / [`NativeVectorUncached`] — the header as a C
//!   compiler lays it out on this host, for checking `HeaderLayout`.
//! - [`ForeignStore`] — a backing store owned by "the other side", used to
//!   check that the engine copies out of it and never frees it.

/// `{ void* memory; int allocationCount; int growSize; }`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct NativeMemory {
    pub memory: *mut u8,
    pub allocation_count: i32,
    pub grow_size: i32,
}

/// Memory block, element count, cached element pointer.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct NativeVector {
    pub memory: NativeMemory,
    pub size: i32,
    pub elements: *mut u8,
}

/// Platform variant without the cached element pointer.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct NativeVectorUncached {
    pub memory: NativeMemory,
    pub size: i32,
}

/// A backing store that the engine must treat as borrowed.
pub struct ForeignStore {
    bytes: Vec<u8>,
    element_size: usize,
}

impl ForeignStore {
    /// A store of `capacity` elements with `values` written at the front.
    pub fn with_cells(capacity: usize, values: &[i32]) -> Self {
        assert!(values.len() <= capacity);
        let mut bytes = vec![0u8; capacity * 4];
        for (slot, value) in bytes.chunks_exact_mut(4).zip(values) {
            slot.copy_from_slice(&value.to_ne_bytes());
        }
        Self {
            bytes,
            element_size: 4,
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }

    /// Capacity in elements.
    pub fn capacity(&self) -> usize {
        self.bytes.len() / self.element_size
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
