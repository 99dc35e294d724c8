//! Legacy capacity growth policy.
//!
//! Callers that inspect the foreign header expect the allocation count to
//! follow one exact sequence, so this reproduces the host library's policy
//! rather than a modern 1.5× or power-of-two-bytes strategy:
//!
//! - With a nonzero grow size hint, round the requested size up to the
//!   next multiple of the hint.
//! - With a zero hint, seed an empty allocation with as many elements as
//!   fit in [`SEED_BYTES`] (at least one), then double until the request
//!   fits.

/// Byte budget of the first allocation under the doubling policy.
pub const SEED_BYTES: usize = 256;

/// Compute the allocation count needed to hold `requested_size` elements.
///
/// Pure. Returns `None` only if the arithmetic overflows `usize`.
/// Otherwise the result is always `>= requested_size`.
pub fn grow(
    allocation_count: usize,
    grow_size_hint: usize,
    requested_size: usize,
    element_size: usize,
) -> Option<usize> {
    if grow_size_hint != 0 {
        return requested_size
            .div_ceil(grow_size_hint)
            .checked_mul(grow_size_hint);
    }

    let mut count = allocation_count;
    if count == 0 {
        count = if element_size > SEED_BYTES {
            1
        } else {
            SEED_BYTES.checked_div(element_size).unwrap_or(1).max(1)
        };
    }
    while count < requested_size {
        count = count.checked_mul(2)?;
    }
    Some(count)
}

/// [`grow`] over the header's signed 32-bit fields.
///
/// Returns `None` for negative inputs or when the result does not fit in
/// an `i32`.
pub fn grow_i32(
    allocation_count: i32,
    grow_size_hint: i32,
    requested_size: i32,
    element_size: usize,
) -> Option<i32> {
    let allocation_count = usize::try_from(allocation_count).ok()?;
    let grow_size_hint = usize::try_from(grow_size_hint).ok()?;
    let requested_size = usize::try_from(requested_size).ok()?;
    let count = grow(allocation_count, grow_size_hint, requested_size, element_size)?;
    i32::try_from(count).ok()
}
