//! utlvec: growable arrays that live inside someone else's struct.
//!
//! A host process owns a small vector header (backing store pointer,
//! allocation count, grow hint, element count and, on most platforms, a
//! cached copy of the pointer). utlvec reads and writes that header in
//! place to append, search and remove fixed-size elements, reallocating
//! the backing store when it fills up.
//!
//! This is the facade crate; it re-exports the sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use utlvec::prelude::*;
//!
//! // Stand-in for the host's header: zeroed, pointer-aligned, large enough.
//! let mut header = [0u64; 4];
//! let addr = header.as_mut_ptr().cast::<u8>();
//!
//! // SAFETY: `header` outlives the buffer and nothing else touches it.
//! let mut buf = unsafe { RawGrowableBuffer::from_raw(addr, 4) }.unwrap();
//! for v in [10i32, 20, 30] {
//!     buf.append(Some(&v.to_ne_bytes())).unwrap();
//! }
//! assert_eq!(buf.count(), 3);
//! assert_eq!(buf.find(&20i32.to_ne_bytes()).unwrap(), Some(1));
//! assert_eq!(buf.allocation_count(), 64);
//!
//! buf.remove_at(0).unwrap();
//! assert_eq!(buf.element(0).unwrap(), &20i32.to_ne_bytes());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `utlvec-core` | Header layouts, the capacity grower, error types |
//! | [`buffer`] | `utlvec-buffer` | The in-place buffer engine and its configuration |
//! | [`ffi`] | `utlvec-ffi` | C ABI entry points and status codes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Header layouts, the capacity grower and error types (`utlvec-core`).
pub use utlvec_core as types;

/// The buffer engine (`utlvec-buffer`).
///
/// [`buffer::RawGrowableBuffer`] is the main type; [`buffer::BufferConfig`]
/// selects the header layout, element size ceiling and release policy.
pub use utlvec_buffer as buffer;

/// C ABI bindings (`utlvec-ffi`).
///
/// The `utlvec_*` functions and [`ffi::UtlStatus`]. Rust callers should
/// use [`buffer`] directly.
pub use utlvec_ffi as ffi;

/// Common imports.
///
/// ```rust
/// use utlvec::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use utlvec_buffer::{
        BufferConfig, ElementLifecycle, PodLifecycle, RawGrowableBuffer, ReleasePolicy,
    };

    // Layout and growth
    pub use utlvec_core::{grow, FieldSpec, HeaderLayout};

    // Errors
    pub use utlvec_core::{BufferError, ConfigError, LayoutError};
}
