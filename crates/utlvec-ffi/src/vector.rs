//! Buffer lifecycle and element operations over `u64` handles.
//!
//! Buffers live in a process-wide handle table. A call locks the table for
//! its whole duration, so concurrent calls on different threads are
//! serialized; the foreign header itself still needs single-writer
//! discipline from the caller.
//!
//! Indices are C `int`s. A negative index is reported as
//! [`UtlStatus::IndexOutOfRange`] exactly like one past the end.

use std::ffi::c_void;
use std::ptr;
use std::sync::Mutex;

use utlvec_buffer::{BufferConfig, RawGrowableBuffer};
use utlvec_core::{BufferError, HeaderLayout};

use crate::handle::HandleTable;
use crate::status::UtlStatus;
use crate::types::UtlHeaderLayout;

static VECTORS: Mutex<HandleTable<RawGrowableBuffer>> = Mutex::new(HandleTable::new());

/// Width of a scripting cell in bytes.
const CELL_WIDTH: usize = 4;

/// Record and log a rejected operation, returning its status code.
fn reject(err: &BufferError) -> i32 {
    log::warn!("utlvec call rejected: {err}");
    crate::set_last_error(err.to_string());
    UtlStatus::from(err) as i32
}

fn reject_with(status: UtlStatus, message: String) -> i32 {
    log::warn!("utlvec call rejected: {message}");
    crate::set_last_error(message);
    status as i32
}

fn invalid_handle(handle: u64) -> i32 {
    reject_with(
        UtlStatus::InvalidHandle,
        format!("invalid utlvec handle {handle:#x}"),
    )
}

fn null_argument(name: &str) -> i32 {
    reject_with(UtlStatus::InvalidArgument, format!("{name} is null"))
}

/// Convert a C index, rejecting negatives with the same error as an index
/// past the end.
fn index_arg(buf: &RawGrowableBuffer, index: i32) -> Result<usize, BufferError> {
    usize::try_from(index).map_err(|_| BufferError::IndexOutOfRange {
        index: i64::from(index),
        count: buf.count(),
    })
}

/// Element bytes for a cell: the value's native bytes in the first
/// `min(4, element_size)` bytes, zero after.
fn cell_element(value: i32, element_size: usize) -> Vec<u8> {
    let mut elem = vec![0u8; element_size];
    let n = element_size.min(CELL_WIDTH);
    elem[..n].copy_from_slice(&value.to_ne_bytes()[..n]);
    elem
}

fn cell_value(elem: &[u8]) -> i32 {
    let mut bytes = [0u8; CELL_WIDTH];
    let n = elem.len().min(CELL_WIDTH);
    bytes[..n].copy_from_slice(&elem[..n]);
    i32::from_ne_bytes(bytes)
}

/// Indices never exceed the header's `int` range.
fn c_index(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[allow(unsafe_code)]
fn register(created: Result<RawGrowableBuffer, BufferError>, handle_out: *mut u64) -> i32 {
    let buf = match created {
        Ok(buf) => buf,
        Err(e) => return reject(&e),
    };
    let header = buf.header_address();
    let element_size = buf.element_size();
    let handle = ffi_lock!(VECTORS).insert(buf);
    log::debug!(
        "utlvec {handle:#x} created over header {header:p} (element size {element_size})"
    );
    // SAFETY: handle_out checked non-null by the caller of this helper.
    unsafe { *handle_out = handle };
    UtlStatus::Ok as i32
}

/// Create a buffer over the header at `header` using the host's native
/// layout.
///
/// Writes the new handle to `*handle_out`. Fails with `InvalidAddress`
/// for a null header, `InvalidElementSize` for a zero or oversized
/// element size and `CorruptHeader` if the header is already
/// inconsistent.
///
/// The header must stay valid until [`utlvec_destroy`]; any backing store
/// it already points at is borrowed and never freed by this library.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_create(
    header: *mut c_void,
    element_size: usize,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return null_argument("handle_out");
        }
        // SAFETY: a non-null header is valid per caller contract.
        let created = unsafe { RawGrowableBuffer::from_raw(header.cast(), element_size) };
        register(created, handle_out)
    })
}

/// Create a buffer over a header with an explicit field layout.
///
/// Fails with `InvalidLayout` when the layout's fields overlap, are
/// misaligned, extend past `size`, or its pointer width is not the host's.
/// Otherwise behaves as [`utlvec_create`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_create_with_layout(
    header: *mut c_void,
    element_size: usize,
    layout: *const UtlHeaderLayout,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if layout.is_null() {
            return null_argument("layout");
        }
        if handle_out.is_null() {
            return null_argument("handle_out");
        }
        // SAFETY: layout is non-null and points to a valid struct.
        let layout = HeaderLayout::from(unsafe { *layout });
        let config = BufferConfig::new(layout);
        // SAFETY: a non-null header is valid per caller contract.
        let created =
            unsafe { RawGrowableBuffer::with_config(header.cast(), element_size, config) };
        register(created, handle_out)
    })
}

/// Write the host's native header layout to `*out`, with or without the
/// cached base pointer.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_native_layout(cached: u8, out: *mut UtlHeaderLayout) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return null_argument("out");
        }
        let layout = if cached != 0 {
            HeaderLayout::native()
        } else {
            HeaderLayout::native_uncached()
        };
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = UtlHeaderLayout::from(&layout) };
        UtlStatus::Ok as i32
    })
}

/// Destroy a handle, releasing the buffer exactly once.
///
/// A backing store the buffer allocated is freed and the header is reset
/// to empty. Destroying a handle twice returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_destroy(handle: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(VECTORS);
        let removed = table.remove(handle);
        let live = table.len();
        drop(table);
        match removed {
            Some(buf) => {
                log::debug!(
                    "utlvec {handle:#x} destroyed with {} elements ({live} handles live)",
                    buf.count()
                );
                buf.release();
                UtlStatus::Ok as i32
            }
            None => invalid_handle(handle),
        }
    })
}

/// Number of live elements.
///
/// Like every read, fails with `CorruptHeader` if the header is
/// inconsistent.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_count(handle: u64, count_out: *mut i32) -> i32 {
    ffi_guard!({
        if count_out.is_null() {
            return null_argument("count_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match buf.header().state() {
            Ok(state) => {
                // SAFETY: count_out is non-null and valid per caller contract.
                unsafe { *count_out = c_index(state.count) };
                UtlStatus::Ok as i32
            }
            Err(e) => reject(&e),
        }
    })
}

/// Writes 1 to `*out` if the buffer has no elements, else 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_is_empty(handle: u64, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return null_argument("out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match buf.header().state() {
            Ok(state) => {
                // SAFETY: out is non-null and valid per caller contract.
                unsafe { *out = u8::from(state.count == 0) };
                UtlStatus::Ok as i32
            }
            Err(e) => reject(&e),
        }
    })
}

/// Writes 1 to `*out` if `0 <= index < count`, else 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_is_valid_index(handle: u64, index: i32, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return null_argument("out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        let state = match buf.header().state() {
            Ok(state) => state,
            Err(e) => return reject(&e),
        };
        let valid = usize::try_from(index).is_ok_and(|i| i < state.count);
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = u8::from(valid) };
        UtlStatus::Ok as i32
    })
}

/// Copy element `index` into `dest`, which must hold at least
/// `element_size` bytes (`BufferTooSmall` otherwise).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_get(handle: u64, index: i32, dest: *mut u8, dest_len: usize) -> i32 {
    ffi_guard!({
        if dest.is_null() {
            return null_argument("dest");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        let elem = match index_arg(buf, index).and_then(|i| buf.element(i)) {
            Ok(elem) => elem,
            Err(e) => return reject(&e),
        };
        if dest_len < elem.len() {
            return reject_with(
                UtlStatus::BufferTooSmall,
                format!("destination holds {dest_len} bytes, element is {}", elem.len()),
            );
        }
        // SAFETY: dest is valid for dest_len >= elem.len() bytes and does
        // not overlap the live element per caller contract.
        unsafe { ptr::copy_nonoverlapping(elem.as_ptr(), dest, elem.len()) };
        UtlStatus::Ok as i32
    })
}

/// Overwrite element `index` with `src_len` bytes from `src`.
///
/// `src_len` must equal the element size (`InvalidArgument` otherwise).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_set(handle: u64, index: i32, src: *const u8, src_len: usize) -> i32 {
    ffi_guard!({
        if src.is_null() {
            return null_argument("src");
        }
        // Copied first: src may point into the buffer's own store.
        // SAFETY: src is valid for src_len bytes per caller contract.
        let value = unsafe { std::slice::from_raw_parts(src, src_len) }.to_vec();
        let mut table = ffi_lock!(VECTORS);
        let buf = match table.get_mut(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match index_arg(buf, index).and_then(|i| buf.set(i, &value)) {
            Ok(()) => UtlStatus::Ok as i32,
            Err(e) => reject(&e),
        }
    })
}

/// Append one element copied from `src`, or zero-filled if `src` is null.
///
/// A non-null `src` must provide exactly `element_size` bytes. The new
/// element's index is written to `*index_out` when it is non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_add_to_tail(
    handle: u64,
    src: *const u8,
    src_len: usize,
    index_out: *mut i32,
) -> i32 {
    ffi_guard!({
        let value = if src.is_null() {
            None
        } else {
            // SAFETY: src is valid for src_len bytes per caller contract.
            Some(unsafe { std::slice::from_raw_parts(src, src_len) }.to_vec())
        };
        let mut table = ffi_lock!(VECTORS);
        let buf = match table.get_mut(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        let index = match buf.append(value.as_deref()) {
            Ok(index) => index,
            Err(e) => return reject(&e),
        };
        if !index_out.is_null() {
            // SAFETY: index_out is non-null and valid per caller contract.
            unsafe { *index_out = c_index(index) };
        }
        UtlStatus::Ok as i32
    })
}

/// Index of the first element byte-equal to `needle`, or -1.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_find(
    handle: u64,
    needle: *const u8,
    needle_len: usize,
    index_out: *mut i32,
) -> i32 {
    ffi_guard!({
        if needle.is_null() {
            return null_argument("needle");
        }
        if index_out.is_null() {
            return null_argument("index_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        // SAFETY: needle is valid for needle_len bytes per caller contract.
        let needle = unsafe { std::slice::from_raw_parts(needle, needle_len) };
        match buf.find(needle) {
            Ok(found) => {
                // SAFETY: index_out is non-null and valid per caller contract.
                unsafe { *index_out = found.map_or(-1, c_index) };
                UtlStatus::Ok as i32
            }
            Err(e) => reject(&e),
        }
    })
}

/// Read element `index` as a 4-byte cell.
///
/// The cell is the element's first `min(4, element_size)` bytes in native
/// byte order, zero-extended.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_get_cell(handle: u64, index: i32, value_out: *mut i32) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return null_argument("value_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match index_arg(buf, index).and_then(|i| buf.element(i)) {
            Ok(elem) => {
                // SAFETY: value_out is non-null and valid per caller contract.
                unsafe { *value_out = cell_value(elem) };
                UtlStatus::Ok as i32
            }
            Err(e) => reject(&e),
        }
    })
}

/// Overwrite element `index` with a cell; bytes past the cell are zeroed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_set_cell(handle: u64, index: i32, value: i32) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(VECTORS);
        let buf = match table.get_mut(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        let elem = cell_element(value, buf.element_size());
        match index_arg(buf, index).and_then(|i| buf.set(i, &elem)) {
            Ok(()) => UtlStatus::Ok as i32,
            Err(e) => reject(&e),
        }
    })
}

/// Append a cell; bytes past the cell are zeroed. `index_out` may be null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_add_to_tail_cell(handle: u64, value: i32, index_out: *mut i32) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(VECTORS);
        let buf = match table.get_mut(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        let elem = cell_element(value, buf.element_size());
        let index = match buf.append(Some(&elem)) {
            Ok(index) => index,
            Err(e) => return reject(&e),
        };
        if !index_out.is_null() {
            // SAFETY: index_out is non-null and valid per caller contract.
            unsafe { *index_out = c_index(index) };
        }
        UtlStatus::Ok as i32
    })
}

/// Index of the first element equal to the cell `value` with zero
/// padding, or -1.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_find_cell(handle: u64, value: i32, index_out: *mut i32) -> i32 {
    ffi_guard!({
        if index_out.is_null() {
            return null_argument("index_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        let needle = cell_element(value, buf.element_size());
        match buf.find(&needle) {
            Ok(found) => {
                // SAFETY: index_out is non-null and valid per caller contract.
                unsafe { *index_out = found.map_or(-1, c_index) };
                UtlStatus::Ok as i32
            }
            Err(e) => reject(&e),
        }
    })
}

/// Remove element `index`, shifting later elements down.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_remove(handle: u64, index: i32) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(VECTORS);
        let buf = match table.get_mut(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match index_arg(buf, index).and_then(|i| buf.remove_at(i)) {
            Ok(()) => UtlStatus::Ok as i32,
            Err(e) => reject(&e),
        }
    })
}

/// Remove every element. The backing store is kept.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_remove_all(handle: u64) -> i32 {
    ffi_guard!({
        let mut table = ffi_lock!(VECTORS);
        let buf = match table.get_mut(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match buf.remove_all() {
            Ok(()) => UtlStatus::Ok as i32,
            Err(e) => reject(&e),
        }
    })
}

/// Write the current backing store address (possibly null) to `*base_out`.
///
/// The address changes whenever an append reallocates.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_get_base(handle: u64, base_out: *mut *mut c_void) -> i32 {
    ffi_guard!({
        if base_out.is_null() {
            return null_argument("base_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        // SAFETY: base_out is non-null and valid per caller contract.
        unsafe { *base_out = buf.base().cast() };
        UtlStatus::Ok as i32
    })
}

/// Write the address of element `index` to `*address_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_get_address(handle: u64, index: i32, address_out: *mut *mut c_void) -> i32 {
    ffi_guard!({
        if address_out.is_null() {
            return null_argument("address_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        match index_arg(buf, index).and_then(|i| buf.element_at(i)) {
            Ok(elem) => {
                // SAFETY: address_out is non-null and valid per caller contract.
                unsafe { *address_out = elem.as_ptr().cast() };
                UtlStatus::Ok as i32
            }
            Err(e) => reject(&e),
        }
    })
}

/// Write the buffer's element size in bytes to `*size_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_element_size(handle: u64, size_out: *mut usize) -> i32 {
    ffi_guard!({
        if size_out.is_null() {
            return null_argument("size_out");
        }
        let table = ffi_lock!(VECTORS);
        let buf = match table.get(handle) {
            Some(buf) => buf,
            None => return invalid_handle(handle),
        };
        // SAFETY: size_out is non-null and valid per caller contract.
        unsafe { *size_out = buf.element_size() };
        UtlStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;
    use utlvec_test_utils::{cells, ForeignStore, HeaderFixture};

    fn create(fixture: &HeaderFixture, element_size: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(
            utlvec_create(fixture.as_ptr().cast(), element_size, &mut h),
            UtlStatus::Ok as i32
        );
        h
    }

    fn push(h: u64, value: i32) -> i32 {
        let mut index = -1;
        assert_eq!(
            utlvec_add_to_tail_cell(h, value, &mut index),
            UtlStatus::Ok as i32
        );
        index
    }

    fn count(h: u64) -> i32 {
        let mut n = -1;
        assert_eq!(utlvec_count(h, &mut n), UtlStatus::Ok as i32);
        n
    }

    fn cell_at(h: u64, index: i32) -> i32 {
        let mut v = 0;
        assert_eq!(utlvec_get_cell(h, index, &mut v), UtlStatus::Ok as i32);
        v
    }

    fn last_error() -> String {
        let mut buf = [0u8; 128];
        let len = crate::utlvec_last_error_message(buf.as_mut_ptr().cast::<c_char>(), buf.len());
        String::from_utf8(buf[..len as usize].to_vec()).unwrap()
    }

    #[test]
    fn cell_round_trip_through_handle() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);

        assert_eq!(push(h, 10), 0);
        assert_eq!(push(h, 20), 1);
        assert_eq!(push(h, 30), 2);
        assert_eq!(count(h), 3);
        assert_eq!(cell_at(h, 1), 20);

        let mut found = 0;
        assert_eq!(utlvec_find_cell(h, 30, &mut found), UtlStatus::Ok as i32);
        assert_eq!(found, 2);
        assert_eq!(utlvec_find_cell(h, 99, &mut found), UtlStatus::Ok as i32);
        assert_eq!(found, -1);

        assert_eq!(utlvec_destroy(h), UtlStatus::Ok as i32);
    }

    #[test]
    fn out_of_range_reports_index_and_count() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        push(h, 1);
        push(h, 2);
        push(h, 3);

        let mut v = 123;
        assert_eq!(
            utlvec_get_cell(h, 5, &mut v),
            UtlStatus::IndexOutOfRange as i32
        );
        assert_eq!(v, 123, "out must not be written on error");
        assert_eq!(last_error(), "invalid index 5 (count: 3)");

        assert_eq!(utlvec_remove(h, -1), UtlStatus::IndexOutOfRange as i32);
        assert_eq!(last_error(), "invalid index -1 (count: 3)");
        assert_eq!(count(h), 3);

        utlvec_destroy(h);
    }

    #[test]
    fn remove_and_remove_all_through_handle() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        for v in [1, 2, 3, 4] {
            push(h, v);
        }
        assert_eq!(utlvec_remove(h, 1), UtlStatus::Ok as i32);
        assert_eq!(
            (0..3).map(|i| cell_at(h, i)).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );

        assert_eq!(utlvec_remove_all(h), UtlStatus::Ok as i32);
        let mut empty = 0u8;
        assert_eq!(utlvec_is_empty(h, &mut empty), UtlStatus::Ok as i32);
        assert_eq!(empty, 1);
        assert_eq!(fixture.allocation_count(), 64);

        utlvec_destroy(h);
    }

    #[test]
    fn is_valid_index_covers_negative_and_past_end() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        push(h, 7);
        let mut out = 9u8;
        for (index, expected) in [(-1, 0), (0, 1), (1, 0)] {
            assert_eq!(
                utlvec_is_valid_index(h, index, &mut out),
                UtlStatus::Ok as i32
            );
            assert_eq!(out, expected, "index {index}");
        }
        utlvec_destroy(h);
    }

    #[test]
    fn wide_element_blob_operations() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 12);

        let a = [1u8; 12];
        let b = [2u8; 12];
        let mut index = -1;
        assert_eq!(
            utlvec_add_to_tail(h, a.as_ptr(), a.len(), &mut index),
            UtlStatus::Ok as i32
        );
        assert_eq!(index, 0);
        assert_eq!(
            utlvec_add_to_tail(h, std::ptr::null(), 0, &mut index),
            UtlStatus::Ok as i32
        );
        assert_eq!(index, 1);
        assert_eq!(
            utlvec_set(h, 1, b.as_ptr(), b.len()),
            UtlStatus::Ok as i32
        );

        let mut out = [0u8; 12];
        assert_eq!(
            utlvec_get(h, 1, out.as_mut_ptr(), out.len()),
            UtlStatus::Ok as i32
        );
        assert_eq!(out, b);

        let mut small = [0u8; 4];
        assert_eq!(
            utlvec_get(h, 0, small.as_mut_ptr(), small.len()),
            UtlStatus::BufferTooSmall as i32
        );

        assert_eq!(
            utlvec_find(h, b.as_ptr(), b.len(), &mut index),
            UtlStatus::Ok as i32
        );
        assert_eq!(index, 1);
        assert_eq!(
            utlvec_find(h, b.as_ptr(), 4, &mut index),
            UtlStatus::InvalidArgument as i32
        );

        utlvec_destroy(h);
    }

    #[test]
    fn wide_cells_are_zero_padded() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 8);
        push(h, -2);

        let mut elem = [0xffu8; 8];
        assert_eq!(
            utlvec_get(h, 0, elem.as_mut_ptr(), elem.len()),
            UtlStatus::Ok as i32
        );
        assert_eq!(&elem[..4], &(-2i32).to_ne_bytes());
        assert_eq!(&elem[4..], &[0; 4]);
        assert_eq!(cell_at(h, 0), -2);

        utlvec_destroy(h);
    }

    #[test]
    fn narrow_cells_keep_leading_bytes() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 2);
        push(h, 0x0102_0304);
        let mut elem = [0u8; 2];
        utlvec_get(h, 0, elem.as_mut_ptr(), elem.len());
        assert_eq!(elem, [0x0102_0304i32.to_ne_bytes()[0], 0x0102_0304i32.to_ne_bytes()[1]]);
        utlvec_destroy(h);
    }

    #[test]
    fn base_and_address_follow_reallocation() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);

        let mut base: *mut c_void = std::ptr::null_mut();
        assert_eq!(utlvec_get_base(h, &mut base), UtlStatus::Ok as i32);
        assert!(base.is_null());

        push(h, 5);
        push(h, 6);
        assert_eq!(utlvec_get_base(h, &mut base), UtlStatus::Ok as i32);
        assert_eq!(base.cast::<u8>(), fixture.base());

        let mut addr: *mut c_void = std::ptr::null_mut();
        assert_eq!(utlvec_get_address(h, 1, &mut addr), UtlStatus::Ok as i32);
        assert_eq!(addr as usize, base as usize + 4);

        let mut es = 0usize;
        assert_eq!(utlvec_element_size(h, &mut es), UtlStatus::Ok as i32);
        assert_eq!(es, 4);

        utlvec_destroy(h);
    }

    #[test]
    fn create_rejects_bad_arguments() {
        let fixture = HeaderFixture::native();
        let mut h = 77u64;
        assert_eq!(
            utlvec_create(std::ptr::null_mut(), 4, &mut h),
            UtlStatus::InvalidAddress as i32
        );
        assert_eq!(
            utlvec_create(fixture.as_ptr().cast(), 0, &mut h),
            UtlStatus::InvalidElementSize as i32
        );
        assert_eq!(
            utlvec_create(fixture.as_ptr().cast(), (1 << 20) + 1, &mut h),
            UtlStatus::InvalidElementSize as i32
        );
        assert_eq!(h, 77, "handle must not be written on error");
        assert_eq!(
            utlvec_create(fixture.as_ptr().cast(), 4, std::ptr::null_mut()),
            UtlStatus::InvalidArgument as i32
        );

        fixture.set_element_count(3);
        assert_eq!(
            utlvec_create(fixture.as_ptr().cast(), 4, &mut h),
            UtlStatus::CorruptHeader as i32
        );
    }

    #[test]
    fn destroy_twice_is_invalid_handle() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        push(h, 1);
        assert_eq!(utlvec_destroy(h), UtlStatus::Ok as i32);
        assert!(fixture.base().is_null());
        assert_eq!(fixture.element_count(), 0);
        assert_eq!(utlvec_destroy(h), UtlStatus::InvalidHandle as i32);

        let mut n = 5;
        assert_eq!(utlvec_count(h, &mut n), UtlStatus::InvalidHandle as i32);
        assert_eq!(n, 5);
        assert_eq!(utlvec_set_cell(h, 0, 1), UtlStatus::InvalidHandle as i32);
        assert!(last_error().starts_with("invalid utlvec handle"));
    }

    #[test]
    fn null_out_pointers_are_invalid_argument() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        assert_eq!(
            utlvec_count(h, std::ptr::null_mut()),
            UtlStatus::InvalidArgument as i32
        );
        assert_eq!(
            utlvec_find_cell(h, 1, std::ptr::null_mut()),
            UtlStatus::InvalidArgument as i32
        );
        assert_eq!(
            utlvec_get_base(h, std::ptr::null_mut()),
            UtlStatus::InvalidArgument as i32
        );
        // index_out is optional for appends.
        assert_eq!(
            utlvec_add_to_tail_cell(h, 1, std::ptr::null_mut()),
            UtlStatus::Ok as i32
        );
        assert_eq!(count(h), 1);
        utlvec_destroy(h);
    }

    #[test]
    fn explicit_layout_create() {
        let fixture = HeaderFixture::native_uncached();
        let mut layout = UtlHeaderLayout::from(&HeaderLayout::native());
        assert_eq!(utlvec_native_layout(0, &mut layout), UtlStatus::Ok as i32);
        assert_eq!(layout.has_cached_base, 0);

        let mut h = 0u64;
        assert_eq!(
            utlvec_create_with_layout(fixture.as_ptr().cast(), 4, &layout, &mut h),
            UtlStatus::Ok as i32
        );
        push(h, 42);
        assert_eq!(fixture.element_count(), 1);
        utlvec_destroy(h);
    }

    #[test]
    fn overlapping_layout_is_invalid_layout() {
        let fixture = HeaderFixture::native();
        let mut layout = UtlHeaderLayout::from(&HeaderLayout::native());
        layout.grow_size_offset = layout.allocation_count_offset;
        let mut h = 0u64;
        assert_eq!(
            utlvec_create_with_layout(fixture.as_ptr().cast(), 4, &layout, &mut h),
            UtlStatus::InvalidLayout as i32
        );
        assert_eq!(
            utlvec_create_with_layout(fixture.as_ptr().cast(), 4, std::ptr::null(), &mut h),
            UtlStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn reads_report_corrupt_header() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        push(h, 1);
        push(h, 2);
        fixture.set_element_count(-1);

        let mut n = 7;
        let mut flag = 9u8;
        assert_eq!(utlvec_count(h, &mut n), UtlStatus::CorruptHeader as i32);
        assert_eq!(utlvec_is_empty(h, &mut flag), UtlStatus::CorruptHeader as i32);
        assert_eq!(
            utlvec_is_valid_index(h, 0, &mut flag),
            UtlStatus::CorruptHeader as i32
        );
        assert_eq!((n, flag), (7, 9));
        assert!(last_error().contains("negative element count"));

        fixture.set_element_count(2);
        assert_eq!(count(h), 2);
        utlvec_destroy(h);
    }

    #[test]
    fn wrapping_offset_layout_is_invalid_layout() {
        let fixture = HeaderFixture::native();
        let mut layout = UtlHeaderLayout::from(&HeaderLayout::native());
        layout.element_count_offset = usize::MAX - 3;
        let mut h = 0u64;
        assert_eq!(
            utlvec_create_with_layout(fixture.as_ptr().cast(), 4, &layout, &mut h),
            UtlStatus::InvalidLayout as i32
        );
        assert_eq!(h, 0);
        assert!(last_error().contains("element_count"), "{}", last_error());

        let mut layout = UtlHeaderLayout::from(&HeaderLayout::native());
        layout.size = usize::MAX;
        assert_eq!(
            utlvec_create_with_layout(fixture.as_ptr().cast(), 4, &layout, &mut h),
            UtlStatus::InvalidLayout as i32
        );
    }

    #[test]
    fn foreign_store_is_left_intact_after_destroy() {
        let fixture = HeaderFixture::native();
        let mut store = ForeignStore::with_cells(2, &[8, 9]);
        fixture.adopt(&mut store, 2);

        let h = create(&fixture, 4);
        assert_eq!(cell_at(h, 1), 9);
        push(h, 10);
        assert_eq!(utlvec_destroy(h), UtlStatus::Ok as i32);
        assert_eq!(cells(store.bytes()), vec![8, 9]);
    }

    #[test]
    fn set_from_own_element_address() {
        let fixture = HeaderFixture::native();
        let h = create(&fixture, 4);
        push(h, 1);
        push(h, 2);
        let mut addr: *mut c_void = std::ptr::null_mut();
        utlvec_get_address(h, 1, &mut addr);
        assert_eq!(
            utlvec_set(h, 0, addr.cast::<u8>().cast_const(), 4),
            UtlStatus::Ok as i32
        );
        assert_eq!(cell_at(h, 0), 2);
        utlvec_destroy(h);
    }

    #[test]
    fn cell_helpers_pad_and_truncate() {
        assert_eq!(cell_element(1, 6).len(), 6);
        assert_eq!(&cell_element(-1, 6)[4..], &[0, 0]);
        assert_eq!(cell_value(&cell_element(123_456, 4)), 123_456);
        assert_eq!(cell_value(&[0x2a]), i32::from_ne_bytes([0x2a, 0, 0, 0]));
    }
}
