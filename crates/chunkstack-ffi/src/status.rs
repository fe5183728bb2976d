//! C-compatible status codes.
//!
//! [`ChunkStackStatus`] is a `repr(i32)` enum returned by every FFI entry
//! point. `Ok` is zero and every error is negative.

use chunkstack::StackError;

/// Status code returned by all FFI functions. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkStackStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// A required pointer is null or an argument is out of range.
    InvalidArgument = -2,
    /// Element size was zero.
    InvalidElementSize = -3,
    /// Chunk capacity cannot hold one element.
    InvalidChunkCapacity = -4,
    /// Pop, peek, or discard on an empty stack.
    EmptyStack = -5,
    /// More elements requested than the stack holds.
    Underflow = -6,
    /// Internal buffer length mismatch.
    SizeMismatch = -7,
    /// Chunk allocation failed.
    AllocationFailed = -8,
    /// Internal error (e.g. poisoned lock after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&StackError> for ChunkStackStatus {
    fn from(e: &StackError) -> Self {
        match e {
            StackError::InvalidElementSize => Self::InvalidElementSize,
            StackError::InvalidChunkCapacity { .. } => Self::InvalidChunkCapacity,
            StackError::EmptyStack => Self::EmptyStack,
            StackError::Underflow { .. } => Self::Underflow,
            StackError::ElementSizeMismatch { .. } => Self::SizeMismatch,
            StackError::AllocationFailed { .. } => Self::AllocationFailed,
        }
    }
}

impl ChunkStackStatus {
    /// Collapse a stack result into the raw code handed to C.
    pub(crate) fn code(result: Result<(), StackError>) -> i32 {
        match result {
            Ok(()) => Self::Ok as i32,
            Err(e) => Self::from(&e) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(ChunkStackStatus::Ok as i32, 0);
        assert_eq!(ChunkStackStatus::InvalidHandle as i32, -1);
        assert_eq!(ChunkStackStatus::InvalidArgument as i32, -2);
        assert_eq!(ChunkStackStatus::InvalidElementSize as i32, -3);
        assert_eq!(ChunkStackStatus::InvalidChunkCapacity as i32, -4);
        assert_eq!(ChunkStackStatus::EmptyStack as i32, -5);
        assert_eq!(ChunkStackStatus::Underflow as i32, -6);
        assert_eq!(ChunkStackStatus::SizeMismatch as i32, -7);
        assert_eq!(ChunkStackStatus::AllocationFailed as i32, -8);
        assert_eq!(ChunkStackStatus::InternalError as i32, -20);
        assert_eq!(ChunkStackStatus::Panicked as i32, -128);
    }

    #[test]
    fn stack_error_to_status() {
        assert_eq!(
            ChunkStackStatus::from(&StackError::EmptyStack),
            ChunkStackStatus::EmptyStack
        );
        assert_eq!(
            ChunkStackStatus::from(&StackError::Underflow {
                requested: 3,
                available: 1,
            }),
            ChunkStackStatus::Underflow
        );
        assert_eq!(
            ChunkStackStatus::from(&StackError::AllocationFailed { bytes: 64 }),
            ChunkStackStatus::AllocationFailed
        );
        assert_eq!(
            ChunkStackStatus::from(&StackError::InvalidChunkCapacity {
                chunk_capacity: 1,
                element_size: 2,
            }),
            ChunkStackStatus::InvalidChunkCapacity
        );
    }

    #[test]
    fn code_collapses_results() {
        assert_eq!(ChunkStackStatus::code(Ok(())), 0);
        assert_eq!(
            ChunkStackStatus::code(Err(StackError::InvalidElementSize)),
            -3
        );
    }
}
