//! Stack lifecycle and element FFI: create, push, pop, peek, clear, destroy.
//!
//! Pointers handed out by [`chunkstack_push_uninitialized`] and
//! [`chunkstack_peek`] point into chunk storage. They stay valid until the
//! next mutating call on the same handle.

use std::ffi::{c_char, CStr};
use std::sync::Mutex;

use chunkstack::{ChunkedStack, StackConfig, StackError};

use crate::handle::HandleTable;
use crate::status::ChunkStackStatus;

static STACKS: Mutex<HandleTable<ChunkedStack>> = Mutex::new(HandleTable::new());

/// Run `f` against the stack behind `handle` with the table locked.
fn with_stack<R>(
    handle: u64,
    f: impl FnOnce(&mut ChunkedStack) -> R,
) -> Result<R, ChunkStackStatus> {
    let mut table = STACKS
        .lock()
        .map_err(|_| ChunkStackStatus::InternalError)?;
    let stack = table
        .get_mut(handle)
        .ok_or(ChunkStackStatus::InvalidHandle)?;
    Ok(f(stack))
}

/// Run `f` against the stack behind `handle` for a read-only query.
fn with_stack_ref<R>(
    handle: u64,
    f: impl FnOnce(&ChunkedStack) -> R,
) -> Result<R, ChunkStackStatus> {
    let table = STACKS
        .lock()
        .map_err(|_| ChunkStackStatus::InternalError)?;
    let stack = table.get(handle).ok_or(ChunkStackStatus::InvalidHandle)?;
    Ok(f(stack))
}

/// Copy `len` caller bytes into an owned buffer.
///
/// Caller memory may point into chunk storage (a peeked top), so it is
/// read before the stack is touched mutably.
#[allow(unsafe_code)]
fn copy_in(src: *const u8, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    // SAFETY: src points to len readable bytes per caller contract, and
    // `bytes` is a fresh allocation so the ranges cannot overlap.
    unsafe { std::ptr::copy_nonoverlapping(src, bytes.as_mut_ptr(), len) };
    bytes
}

/// Copy popped bytes out to caller memory once the stack borrow has ended.
#[allow(unsafe_code)]
fn copy_out(bytes: &[u8], dst: *mut u8) {
    // SAFETY: dst points to bytes.len() writable bytes per caller contract.
    unsafe { std::ptr::copy(bytes.as_ptr(), dst, bytes.len()) };
}

fn status(result: Result<Result<(), StackError>, ChunkStackStatus>) -> i32 {
    match result {
        Ok(inner) => ChunkStackStatus::code(inner),
        Err(status) => status as i32,
    }
}

/// Create a stack for elements of `element_size` bytes.
///
/// `chunk_capacity` is the chunk size in bytes; 0 selects 1024 elements
/// per chunk. `description` may be null; when set it must be a
/// NUL-terminated string and is only used for diagnostics. On success the
/// new handle is written to `handle_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_create(
    element_size: usize,
    chunk_capacity: usize,
    description: *const c_char,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return ChunkStackStatus::InvalidArgument as i32;
        }
        let mut config = StackConfig::new(element_size).chunk_capacity(chunk_capacity);
        if !description.is_null() {
            // SAFETY: description is a valid NUL-terminated string per caller contract.
            let label = unsafe { CStr::from_ptr(description) };
            config = config.description(label.to_string_lossy());
        }
        let stack = match ChunkedStack::from_config(config) {
            Ok(stack) => stack,
            Err(e) => return ChunkStackStatus::from(&e) as i32,
        };
        let handle = match STACKS.lock() {
            Ok(mut table) => table.insert(stack),
            Err(_) => return ChunkStackStatus::InternalError as i32,
        };
        // SAFETY: handle_out is valid per caller contract.
        unsafe { *handle_out = handle };
        ChunkStackStatus::Ok as i32
    })
}

/// Destroy a stack and free all of its chunks.
///
/// Destroying an already-destroyed handle returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_destroy(handle: u64) -> i32 {
    ffi_guard!({
        let removed = match STACKS.lock() {
            Ok(mut table) => table.remove(handle),
            Err(_) => return ChunkStackStatus::InternalError as i32,
        };
        // Chunks are freed here, outside the table lock.
        match removed {
            Some(_) => ChunkStackStatus::Ok as i32,
            None => ChunkStackStatus::InvalidHandle as i32,
        }
    })
}

/// Push a copy of the `element_size` bytes at `src`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_push(handle: u64, src: *const u8) -> i32 {
    ffi_guard!({
        if src.is_null() {
            return ChunkStackStatus::InvalidArgument as i32;
        }
        status(with_stack(handle, |stack| {
            let bytes = copy_in(src, stack.element_size());
            stack.push(&bytes)
        }))
    })
}

/// Reserve a new top slot and write its address to `slot_out`.
///
/// The slot is `element_size` bytes with unspecified contents; the caller
/// fills it before the next call on this handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_push_uninitialized(handle: u64, slot_out: *mut *mut u8) -> i32 {
    ffi_guard!({
        if slot_out.is_null() {
            return ChunkStackStatus::InvalidArgument as i32;
        }
        let slot = match with_stack(handle, |stack| {
            stack.push_uninitialized().map(|slot| slot.as_mut_ptr())
        }) {
            Ok(Ok(slot)) => slot,
            Ok(Err(e)) => return ChunkStackStatus::from(&e) as i32,
            Err(status) => return status as i32,
        };
        // SAFETY: slot_out is valid per caller contract.
        unsafe { *slot_out = slot };
        ChunkStackStatus::Ok as i32
    })
}

/// Pop the top element into `dst` (`element_size` bytes).
///
/// A null `dst` drops the element without copying.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_pop(handle: u64, dst: *mut u8) -> i32 {
    ffi_guard!({
        if dst.is_null() {
            return status(with_stack(handle, |stack| stack.discard()));
        }
        let popped = with_stack(handle, |stack| {
            let mut out = vec![0u8; stack.element_size()];
            stack.pop_into(&mut out).map(|()| out)
        });
        match popped {
            Ok(Ok(out)) => {
                copy_out(&out, dst);
                ChunkStackStatus::Ok as i32
            }
            Ok(Err(e)) => ChunkStackStatus::from(&e) as i32,
            Err(status) => status as i32,
        }
    })
}

/// Drop the top element.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_discard(handle: u64) -> i32 {
    ffi_guard!({ status(with_stack(handle, |stack| stack.discard())) })
}

/// Pop `n` elements into `dst` (`n * element_size` bytes), former top first.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_pop_n(handle: u64, dst: *mut u8, n: usize) -> i32 {
    ffi_guard!({ pop_many(handle, dst, n, false) })
}

/// Pop `n` elements into `dst` (`n * element_size` bytes), oldest first.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_pop_n_reverse(handle: u64, dst: *mut u8, n: usize) -> i32 {
    ffi_guard!({ pop_many(handle, dst, n, true) })
}

fn pop_many(handle: u64, dst: *mut u8, n: usize, reverse: bool) -> i32 {
    if n == 0 {
        return status(with_stack(handle, |_| Ok(())));
    }
    if dst.is_null() {
        return ChunkStackStatus::InvalidArgument as i32;
    }
    let popped = with_stack(handle, |stack| {
        let available = stack.count();
        if n > available {
            return Err(StackError::Underflow {
                requested: n,
                available,
            });
        }
        // n is bounded by the element count, so this cannot overflow.
        let mut out = vec![0u8; n * stack.element_size()];
        if reverse {
            stack.pop_n_reverse(&mut out, n)?;
        } else {
            stack.pop_n(&mut out, n)?;
        }
        Ok(out)
    });
    match popped {
        Ok(Ok(out)) => {
            copy_out(&out, dst);
            ChunkStackStatus::Ok as i32
        }
        Ok(Err(e)) => ChunkStackStatus::from(&e) as i32,
        Err(status) => status as i32,
    }
}

/// Write the address of the top element to `top_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_peek(handle: u64, top_out: *mut *const u8) -> i32 {
    ffi_guard!({
        if top_out.is_null() {
            return ChunkStackStatus::InvalidArgument as i32;
        }
        let top = match with_stack_ref(handle, |stack| stack.peek().map(|top| top.as_ptr())) {
            Ok(Ok(top)) => top,
            Ok(Err(e)) => return ChunkStackStatus::from(&e) as i32,
            Err(status) => return status as i32,
        };
        // SAFETY: top_out is valid per caller contract.
        unsafe { *top_out = top };
        ChunkStackStatus::Ok as i32
    })
}

/// Free every chunk; the handle stays valid and empty.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_clear(handle: u64) -> i32 {
    ffi_guard!({
        status(with_stack(handle, |stack| {
            stack.clear();
            Ok(())
        }))
    })
}

/// Number of elements on the stack. Returns 0 for an invalid handle;
/// use [`chunkstack_count_get`] to tell the two apart.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_count(handle: u64) -> usize {
    ffi_guard_or!(0, { with_stack_ref(handle, |stack| stack.count()).unwrap_or(0) })
}

/// Write the element count to `count_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_count_get(handle: u64, count_out: *mut usize) -> i32 {
    ffi_guard!({
        if count_out.is_null() {
            return ChunkStackStatus::InvalidArgument as i32;
        }
        match with_stack_ref(handle, |stack| stack.count()) {
            Ok(count) => {
                // SAFETY: count_out is valid per caller contract.
                unsafe { *count_out = count };
                ChunkStackStatus::Ok as i32
            }
            Err(status) => status as i32,
        }
    })
}

/// 1 if the stack is empty (or the handle is invalid), 0 otherwise.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_is_empty(handle: u64) -> u8 {
    ffi_guard_or!(1, {
        with_stack_ref(handle, |stack| u8::from(stack.is_empty())).unwrap_or(1)
    })
}

/// Element size in bytes, or 0 for an invalid handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn chunkstack_element_size(handle: u64) -> usize {
    ffi_guard_or!(0, { with_stack_ref(handle, |stack| stack.element_size()).unwrap_or(0) })
}
