//! C FFI bindings for utlvec.
//!
//! Exposes each buffer operation as an `extern "C"` function over opaque
//! `u64` handles. Every entry point returns an `i32` [`UtlStatus`], writes
//! results through out-pointers, and catches panics before they reach the
//! caller. The C header is generated into `include/utlvec.h` at build time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::cell::RefCell;
use std::ffi::c_char;
use std::ptr;

/// Run an entry point body, converting a panic into
/// [`UtlStatus::Panicked`] and recording its message for
/// [`utlvec_last_panic_message`].
macro_rules! ffi_guard {
    ($body:block) => {{
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(payload) => {
                let message = $crate::panic_message(payload.as_ref());
                log::error!("panic caught at utlvec FFI boundary: {message}");
                $crate::LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
                $crate::status::UtlStatus::Panicked as i32
            }
        }
    }};
}

/// Lock a mutex inside [`ffi_guard!`], returning
/// [`UtlStatus::InternalError`] if a previous panic poisoned it.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::error!("utlvec handle table poisoned by an earlier panic");
                return $crate::status::UtlStatus::InternalError as i32;
            }
        }
    };
}

pub mod status;
pub mod types;
pub mod vector;

mod handle;

pub use status::UtlStatus;
pub use types::UtlHeaderLayout;
pub use vector::*;

thread_local! {
    /// Message of the last panic caught on this thread.
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };

    /// Display text of the last rejected call on this thread.
    pub(crate) static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

pub(crate) fn set_last_error(message: String) {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = message);
}

/// Copy `message` into a C buffer of `cap` bytes, NUL-terminated and
/// truncated to fit. Returns the full message length in bytes.
#[allow(unsafe_code)]
fn copy_message(message: &str, buf: *mut c_char, cap: usize) -> i32 {
    let bytes = message.as_bytes();
    if !buf.is_null() && cap > 0 {
        let n = bytes.len().min(cap - 1);
        // SAFETY: buf is valid for cap bytes per caller contract; n < cap.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
            *buf.add(n) = 0;
        }
    }
    i32::try_from(bytes.len()).unwrap_or(i32::MAX)
}

/// Copy the message of the last panic caught on this thread into `buf`.
///
/// Returns the message length, which may exceed `cap - 1` when the copy
/// was truncated. Pass a null `buf` to query the length alone. Returns 0
/// when no panic has been caught.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| copy_message(&cell.borrow(), buf, cap))
}

/// Copy the description of the last failed call on this thread into `buf`,
/// e.g. `"invalid index 5 (count: 3)"`.
///
/// Successful calls leave the message in place. Length and truncation
/// behave as in [`utlvec_last_panic_message`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn utlvec_last_error_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_ERROR.with(|cell| copy_message(&cell.borrow(), buf, cap))
}
