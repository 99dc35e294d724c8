//! C-compatible status codes.
//!
//! Every entry point returns a [`UtlStatus`] cast to `i32`. `Ok` is zero,
//! errors are negative, and the values never change between releases.

use utlvec_core::{BufferError, ConfigError};

/// Status code returned by every `utlvec_*` function.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UtlStatus {
    /// Success.
    Ok = 0,
    /// Handle is unknown or was already destroyed.
    InvalidHandle = -1,
    /// Header address is null.
    InvalidAddress = -2,
    /// Element size is zero or above the configured ceiling.
    InvalidElementSize = -3,
    /// Index is negative or not below the element count.
    IndexOutOfRange = -4,
    /// A backing store could not be allocated, or its size overflowed.
    AllocationFailed = -5,
    /// The header's fields contradict each other.
    CorruptHeader = -6,
    /// The supplied header layout is inconsistent.
    InvalidLayout = -7,
    /// A pointer argument is null, or a length does not match the stride.
    InvalidArgument = -8,
    /// Caller-provided output buffer is too small.
    BufferTooSmall = -9,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -10,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&BufferError> for UtlStatus {
    fn from(e: &BufferError) -> Self {
        match e {
            BufferError::NullAddress => UtlStatus::InvalidAddress,
            BufferError::InvalidElementSize { .. } => UtlStatus::InvalidElementSize,
            BufferError::IndexOutOfRange { .. } => UtlStatus::IndexOutOfRange,
            BufferError::AllocationFailed { .. } | BufferError::CapacityOverflow { .. } => {
                UtlStatus::AllocationFailed
            }
            BufferError::CorruptHeader { .. } => UtlStatus::CorruptHeader,
            BufferError::ElementSizeMismatch { .. } => UtlStatus::InvalidArgument,
            BufferError::InvalidLayout(_) | BufferError::Config(ConfigError::Layout(_)) => {
                UtlStatus::InvalidLayout
            }
            BufferError::Config(_) => UtlStatus::InvalidArgument,
        }
    }
}
