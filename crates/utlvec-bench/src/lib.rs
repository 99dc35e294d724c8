//! Benchmark profiles for utlvec.
//!
//! - [`Profile`]: element count and stride for one benchmark shape
//! - [`element_stream`]: deterministic element bytes for a profile
//! - [`fill`]: append a stream to a buffer

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use utlvec_buffer::RawGrowableBuffer;
use utlvec_core::BufferError;

/// Shape of a benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Human-readable name used as the criterion benchmark id.
    pub name: &'static str,
    /// Number of elements appended.
    pub elements: usize,
    /// Element size in bytes.
    pub element_size: usize,
}

/// 1K scripting cells: the common case for plugin-owned vectors.
pub const CELLS_1K: Profile = Profile {
    name: "cells_1k",
    elements: 1_000,
    element_size: 4,
};

/// 64K scripting cells: enough to cross several doublings.
pub const CELLS_64K: Profile = Profile {
    name: "cells_64k",
    elements: 64_000,
    element_size: 4,
};

/// 1K 96-byte records: the 256-byte seed gives only two slots.
pub const RECORDS_1K: Profile = Profile {
    name: "records_1k",
    elements: 1_000,
    element_size: 96,
};

/// Every profile, for benchmarks that sweep them.
pub const PROFILES: [Profile; 3] = [CELLS_1K, CELLS_64K, RECORDS_1K];

/// Deterministic element bytes for `profile`, flattened.
///
/// Each element starts with its index as a native-endian `u32` so that
/// elements are distinct and `find` has a well-defined target; the rest
/// is filled from a seeded LCG.
pub fn element_stream(profile: &Profile, seed: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(profile.elements * profile.element_size);
    let mut state = seed;
    for i in 0..profile.elements {
        let tag = (i as u32).to_ne_bytes();
        for b in 0..profile.element_size {
            let byte = if b < tag.len() {
                tag[b]
            } else {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 56) as u8
            };
            out.push(byte);
        }
    }
    out
}

/// Append every element of `stream` to `buf`.
pub fn fill(buf: &mut RawGrowableBuffer, stream: &[u8]) -> Result<(), BufferError> {
    for elem in stream.chunks_exact(buf.element_size()) {
        buf.append(Some(elem))?;
    }
    Ok(())
}
