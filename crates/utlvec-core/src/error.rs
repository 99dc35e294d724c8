//! Error types for the utlvec engine.
//!
//! [`BufferError`] is returned by every fallible engine operation. Layout
//! and configuration problems have their own enums so they can be reported
//! before a buffer exists.

use std::error::Error;
use std::fmt;

use crate::layout::HeaderField;

/// Errors from the growable-buffer engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// The foreign header address was null.
    NullAddress,
    /// Element size was zero or above the configured ceiling.
    InvalidElementSize {
        /// The rejected element size in bytes.
        size: usize,
        /// The configured ceiling in bytes.
        max: usize,
    },
    /// An indexed operation named an element outside `0..count`.
    IndexOutOfRange {
        /// The requested index (may be negative when it came from a caller).
        index: i64,
        /// Element count at the time of the call.
        count: usize,
    },
    /// The allocator could not provide the new backing store.
    AllocationFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
    },
    /// The requested element count cannot be represented in the header.
    CapacityOverflow {
        /// The element count that could not be satisfied.
        requested: usize,
    },
    /// The foreign header holds values that violate its invariants.
    CorruptHeader {
        /// Human-readable description of the violation.
        reason: String,
    },
    /// A source element did not have exactly `element_size` bytes.
    ElementSizeMismatch {
        /// The buffer's element size.
        expected: usize,
        /// Length of the supplied bytes.
        actual: usize,
    },
    /// The header layout failed validation.
    InvalidLayout(LayoutError),
    /// The buffer configuration failed validation.
    Config(ConfigError),
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullAddress => write!(f, "invalid address for vector header"),
            Self::InvalidElementSize { size, max } => {
                write!(f, "invalid element size {size} (must be 1..={max})")
            }
            Self::IndexOutOfRange { index, count } => {
                write!(f, "invalid index {index} (count: {count})")
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} bytes for backing store")
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow growing to {requested} elements")
            }
            Self::CorruptHeader { reason } => write!(f, "corrupt vector header: {reason}"),
            Self::ElementSizeMismatch { expected, actual } => {
                write!(f, "element is {actual} bytes, expected {expected}")
            }
            Self::InvalidLayout(e) => write!(f, "invalid header layout: {e}"),
            Self::Config(e) => write!(f, "invalid buffer config: {e}"),
        }
    }
}

impl Error for BufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLayout(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for BufferError {
    fn from(e: LayoutError) -> Self {
        Self::InvalidLayout(e)
    }
}

impl From<ConfigError> for BufferError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Problems found by `HeaderLayout::validate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout's pointer width differs from the host's.
    PointerWidthMismatch {
        /// Host pointer width in bytes.
        host: usize,
        /// Pointer width declared by the layout.
        layout: usize,
    },
    /// A field has the wrong width for its kind.
    FieldWidth {
        /// The offending field.
        field: HeaderField,
        /// Width required for this field.
        expected: usize,
        /// Width declared by the layout.
        actual: usize,
    },
    /// A field is not naturally aligned.
    Misaligned {
        /// The offending field.
        field: HeaderField,
        /// Declared offset.
        offset: usize,
        /// Required alignment.
        align: usize,
    },
    /// The declared header size is larger than any addressable object.
    HeaderTooLarge {
        /// Declared header size.
        size: usize,
        /// Largest size the host can address.
        max: usize,
    },
    /// A field extends past the end of the header.
    OutOfBounds {
        /// The offending field.
        field: HeaderField,
        /// One past the field's last byte.
        end: usize,
        /// Declared header size.
        size: usize,
    },
    /// Two fields share bytes.
    Overlap {
        /// The earlier field.
        first: HeaderField,
        /// The later field.
        second: HeaderField,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointerWidthMismatch { host, layout } => write!(
                f,
                "layout pointer width {layout} does not match host pointer width {host}"
            ),
            Self::FieldWidth {
                field,
                expected,
                actual,
            } => write!(f, "field {field} is {actual} bytes wide, expected {expected}"),
            Self::Misaligned {
                field,
                offset,
                align,
            } => write!(f, "field {field} at offset {offset} is not {align}-byte aligned"),
            Self::HeaderTooLarge { size, max } => {
                write!(f, "header size {size} exceeds the addressable maximum {max}")
            }
            Self::OutOfBounds { field, end, size } => {
                write!(f, "field {field} ends at {end}, past header size {size}")
            }
            Self::Overlap { first, second } => write!(f, "fields {first} and {second} overlap"),
        }
    }
}

impl Error for LayoutError {}

/// Problems found when validating a buffer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The element size ceiling was zero.
    ZeroMaxElementSize,
    /// The backing store alignment was not a power of two.
    InvalidStoreAlign {
        /// The rejected alignment.
        align: usize,
    },
    /// The header layout failed validation.
    Layout(LayoutError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxElementSize => write!(f, "max_element_size must be at least 1"),
            Self::InvalidStoreAlign { align } => {
                write!(f, "store_align {align} is not a power of two")
            }
            Self::Layout(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}
