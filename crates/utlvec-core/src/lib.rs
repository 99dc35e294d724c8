//! Core types for the utlvec growable-buffer engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces of the engine that carry no state and touch no memory:
//! the foreign header layout descriptor, the legacy capacity growth policy,
//! and the error types shared by the engine and the binding layer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grow;
pub mod layout;

pub use error::{BufferError, ConfigError, LayoutError};
pub use grow::{grow, grow_i32};
pub use layout::{FieldSpec, HeaderField, HeaderLayout};
