//! In-place growable buffer engine over a foreign vector header.
//!
//! A foreign process owns a small, ABI-fixed header (`base`, `allocation
//! count`, `grow size`, `element count`, optional cached `base`). This
//! crate reads and mutates that header in place, allocating and freeing
//! the element backing store itself. It is one of two crates in the
//! workspace that may contain `unsafe` code (along with `utlvec-ffi`).
//!
//! # Architecture
//!
//! ```text
//! RawGrowableBuffer<L>
//! ├── ForeignHeader   (borrowed header, accessed via HeaderLayout offsets)
//! ├── OwnedStore      (backing store this buffer allocated, freed on drop)
//! ├── BufferConfig    (layout, element size ceiling, store alignment, release policy)
//! └── L: ElementLifecycle (construct/destruct hooks, PodLifecycle by default)
//! ```
//!
//! # Unsafe surface
//!
//! All raw memory access lives in `raw.rs`. The other modules call those
//! primitives under a `// SAFETY:` comment stating the invariant relied on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod header;
pub mod lifecycle;
mod raw;
mod store;

// Public re-exports for the primary API surface.
pub use buffer::RawGrowableBuffer;
pub use config::{BufferConfig, ReleasePolicy};
pub use header::{ForeignHeader, HeaderState};
pub use lifecycle::{ElementLifecycle, PodLifecycle};
