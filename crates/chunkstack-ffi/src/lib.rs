//! C FFI bindings for the chunkstack chunked stack.
//!
//! Exposes the byte-oriented [`ChunkedStack`](chunkstack::ChunkedStack) to
//! C callers through opaque `u64` handles. Every entry point returns a
//! [`ChunkStackStatus`](status::ChunkStackStatus) code (or a plain value for
//! simple accessors), and no panic ever unwinds into foreign code: panics
//! are caught, reported as `Panicked`, and their message kept for
//! [`chunkstack_last_panic_message`].
//!
//! Stacks live in one global table behind a single `Mutex`, which is the
//! external lock the stack itself does not provide.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

/// Run an FFI body, turning a panic into `Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::ChunkStackStatus::Panicked as i32, $body)
    };
}

/// Run an FFI body, returning `$fallback` if it panics.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(payload.as_ref());
                $fallback
            }
        }
    };
}

pub(crate) mod handle;
pub mod stack;
pub mod status;

thread_local! {
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Store the message of a caught panic for this thread.
pub(crate) fn record_panic(payload: &(dyn Any + Send)) {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("panic with non-string payload")
    };
    LAST_PANIC.with(|cell| *cell.borrow_mut() = message);
}

/// Copy the last panic message caught on this thread into `buf`.
///
/// Writes at most `cap - 1` bytes plus a NUL terminator. Returns the full
/// message length in bytes (excluding the NUL), or 0 if no panic has been
/// recorded. Pass a null `buf` to query the length only.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let message = cell.borrow();
        let len = message.len().min(i32::MAX as usize);
        if !buf.is_null() && cap > 0 {
            let n = len.min(cap - 1);
            // SAFETY: buf points to at least `cap` writable bytes per caller
            // contract, and n < cap leaves room for the terminator.
            unsafe {
                std::ptr::copy_nonoverlapping(message.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        len as i32
    })
}
