//! Stack configuration parameters.

use crate::error::StackError;

/// Configuration for a byte-oriented [`ChunkedStack`](crate::ChunkedStack).
///
/// Element size and chunk capacity are fixed for the lifetime of the stack.
/// Validated at construction; a stack never re-reads its config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackConfig {
    /// Size of one element in bytes. Must be non-zero.
    pub element_size: usize,

    /// Size of each chunk in bytes.
    ///
    /// `0` selects the default of [`DEFAULT_CHUNK_ELEMENTS`](Self::DEFAULT_CHUNK_ELEMENTS)
    /// elements per chunk. Any remainder after dividing by `element_size`
    /// is left unused.
    pub chunk_capacity: usize,

    /// Optional label shown in `Debug` output. Has no effect on behaviour.
    pub description: Option<String>,
}

impl StackConfig {
    /// Default number of elements per chunk when no capacity is given.
    pub const DEFAULT_CHUNK_ELEMENTS: usize = 1024;

    /// Create a config for elements of `element_size` bytes with the default
    /// chunk capacity.
    pub fn new(element_size: usize) -> Self {
        Self {
            element_size,
            chunk_capacity: 0,
            description: None,
        }
    }

    /// Set the chunk capacity in bytes (`0` keeps the default).
    pub fn chunk_capacity(mut self, bytes: usize) -> Self {
        self.chunk_capacity = bytes;
        self
    }

    /// Attach a diagnostic label.
    pub fn description(mut self, label: impl Into<String>) -> Self {
        self.description = Some(label.into());
        self
    }

    /// Check the config and return the number of element slots per chunk.
    pub fn validate(&self) -> Result<usize, StackError> {
        if self.element_size == 0 {
            return Err(StackError::InvalidElementSize);
        }
        let bytes = self.resolved_chunk_bytes()?;
        let slots = bytes / self.element_size;
        if slots == 0 {
            return Err(StackError::InvalidChunkCapacity {
                chunk_capacity: bytes,
                element_size: self.element_size,
            });
        }
        Ok(slots)
    }

    /// Usable bytes per chunk: the slot count times the element size.
    pub fn usable_chunk_bytes(&self) -> Result<usize, StackError> {
        Ok(self.validate()? * self.element_size)
    }

    fn resolved_chunk_bytes(&self) -> Result<usize, StackError> {
        if self.chunk_capacity > 0 {
            return Ok(self.chunk_capacity);
        }
        self.element_size
            .checked_mul(Self::DEFAULT_CHUNK_ELEMENTS)
            .ok_or(StackError::InvalidChunkCapacity {
                chunk_capacity: usize::MAX,
                element_size: self.element_size,
            })
    }
}
