//! Stack error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during stack construction and operations.
///
/// Every operation validates its inputs before touching the chunk list,
/// so an `Err` return always leaves the stack exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackError {
    /// The element size was zero.
    InvalidElementSize,
    /// The chunk capacity cannot hold a single element, or the default
    /// capacity overflows `usize`.
    InvalidChunkCapacity {
        /// Requested chunk capacity in bytes.
        chunk_capacity: usize,
        /// Element size in bytes.
        element_size: usize,
    },
    /// Pop, peek, or discard on a stack with no elements.
    EmptyStack,
    /// More elements were requested than the stack holds.
    Underflow {
        /// Number of elements requested.
        requested: usize,
        /// Number of elements available.
        available: usize,
    },
    /// A caller-provided buffer has the wrong length.
    ElementSizeMismatch {
        /// Required length in bytes.
        expected: usize,
        /// Length actually provided.
        actual: usize,
    },
    /// Reserving storage for a new chunk failed.
    AllocationFailed {
        /// Number of bytes requested.
        bytes: usize,
    },
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElementSize => write!(f, "element size must be non-zero"),
            Self::InvalidChunkCapacity {
                chunk_capacity,
                element_size,
            } => {
                write!(
                    f,
                    "chunk capacity {chunk_capacity} bytes cannot hold elements of {element_size} bytes"
                )
            }
            Self::EmptyStack => write!(f, "stack is empty"),
            Self::Underflow {
                requested,
                available,
            } => {
                write!(
                    f,
                    "stack underflow: requested {requested} elements, {available} available"
                )
            }
            Self::ElementSizeMismatch { expected, actual } => {
                write!(f, "buffer length mismatch: expected {expected} bytes, got {actual}")
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "chunk allocation of {bytes} bytes failed")
            }
        }
    }
}

impl Error for StackError {}
