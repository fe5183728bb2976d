//! Byte-oriented chunked stack.
//!
//! [`ChunkedStack`] stores opaque elements of a fixed byte size. It is the
//! form to reach for when the element type is only known at runtime (for
//! example across the C ABI); statically typed code should prefer
//! [`TypedStack`](crate::TypedStack).
//!
//! # Chunk policy
//!
//! - A chunk is allocated on push when there is no chunk or the head chunk
//!   is full.
//! - A pop that brings the offset to zero leaves the spent chunk resident.
//!   The *next* pop or discard frees it, promotes the older chunk (which is
//!   always full), and retracts from there.
//! - `clear` and drop release every chunk.

use std::fmt;

use crate::chunk::{ChunkList, StackStats};
use crate::config::StackConfig;
use crate::error::StackError;

/// A LIFO stack of fixed-size byte elements stored in lazily allocated chunks.
///
/// Elements never move once pushed. All operations are O(1) amortised: one
/// chunk allocation or free per `slots_per_chunk` elements.
pub struct ChunkedStack {
    element_size: usize,
    /// Usable bytes per chunk, a whole multiple of `element_size`.
    chunk_capacity: usize,
    /// Bytes consumed in the head chunk.
    offset: usize,
    count: usize,
    chunks: ChunkList<u8>,
    description: Option<String>,
}

impl ChunkedStack {
    /// Create an empty stack with the default chunk capacity.
    ///
    /// Returns `Err(StackError::InvalidElementSize)` if `element_size` is zero.
    pub fn new(element_size: usize) -> Result<Self, StackError> {
        Self::from_config(StackConfig::new(element_size))
    }

    /// Create an empty stack whose chunks hold `chunk_capacity` bytes.
    ///
    /// A `chunk_capacity` of zero selects the default.
    pub fn with_chunk_capacity(
        element_size: usize,
        chunk_capacity: usize,
    ) -> Result<Self, StackError> {
        Self::from_config(StackConfig::new(element_size).chunk_capacity(chunk_capacity))
    }

    /// Create an empty stack from a full config. No chunk is allocated
    /// until the first push.
    pub fn from_config(config: StackConfig) -> Result<Self, StackError> {
        let chunk_capacity = config.usable_chunk_bytes()?;
        Ok(Self {
            element_size: config.element_size,
            chunk_capacity,
            offset: 0,
            count: 0,
            chunks: ChunkList::new(),
            description: config.description,
        })
    }

    /// Reserve a new top slot and return it for the caller to fill.
    ///
    /// The returned slice is exactly `element_size` bytes. Its contents are
    /// unspecified: fresh chunks are zeroed, reused slots hold whatever was
    /// popped from them last.
    ///
    /// On allocation failure the stack is unchanged.
    pub fn push_uninitialized(&mut self) -> Result<&mut [u8], StackError> {
        let fresh = self.chunks.is_empty() || self.offset == self.chunk_capacity;
        let chunk = self.chunks.head_or_grow(!fresh, self.chunk_capacity)?;
        if fresh {
            // Reserved above, so this never reallocates.
            chunk.slots.resize(self.chunk_capacity, 0);
            self.offset = 0;
        }
        let start = self.offset;
        self.offset += self.element_size;
        self.count += 1;
        Ok(&mut chunk.slots[start..self.offset])
    }

    /// Push a copy of `src`, which must be exactly `element_size` bytes.
    pub fn push(&mut self, src: &[u8]) -> Result<(), StackError> {
        self.check_len(src.len())?;
        self.push_uninitialized()?.copy_from_slice(src);
        Ok(())
    }

    /// Remove the top element, copying it into `dst` if one is given.
    ///
    /// `dst` must be exactly `element_size` bytes. Passing `None` drops the
    /// element without copying, same as [`discard`](Self::discard).
    pub fn pop(&mut self, dst: Option<&mut [u8]>) -> Result<(), StackError> {
        self.check_non_empty()?;
        if let Some(dst) = dst.as_deref() {
            self.check_len(dst.len())?;
        }
        self.pop_unchecked(dst);
        Ok(())
    }

    /// Remove the top element into `dst`.
    pub fn pop_into(&mut self, dst: &mut [u8]) -> Result<(), StackError> {
        self.pop(Some(dst))
    }

    /// Remove the top element without copying it anywhere.
    pub fn discard(&mut self) -> Result<(), StackError> {
        self.pop(None)
    }

    /// Borrow the top element without removing it.
    pub fn peek(&self) -> Result<&[u8], StackError> {
        self.check_non_empty()?;
        let (depth, end) = self.top_position();
        match self.chunks.nth(depth) {
            Some(chunk) => Ok(&chunk.slots[end - self.element_size..end]),
            None => Err(StackError::EmptyStack),
        }
    }

    /// Mutably borrow the top element in place.
    pub fn peek_mut(&mut self) -> Result<&mut [u8], StackError> {
        self.check_non_empty()?;
        let (depth, end) = self.top_position();
        let start = end - self.element_size;
        match self.chunks.nth_mut(depth) {
            Some(chunk) => Ok(&mut chunk.slots[start..end]),
            None => Err(StackError::EmptyStack),
        }
    }

    /// Pop `n` elements into `dst` in pop order: `dst[0]` receives the
    /// former top.
    ///
    /// `dst` must be exactly `n * element_size` bytes. Nothing is popped
    /// unless the whole request can be satisfied.
    pub fn pop_n(&mut self, dst: &mut [u8], n: usize) -> Result<(), StackError> {
        self.check_pop_n(dst.len(), n)?;
        for slot in dst.chunks_exact_mut(self.element_size) {
            self.pop_unchecked(Some(slot));
        }
        Ok(())
    }

    /// Pop `n` elements into `dst` in push order: `dst[0]` receives the
    /// oldest of the `n`.
    pub fn pop_n_reverse(&mut self, dst: &mut [u8], n: usize) -> Result<(), StackError> {
        self.check_pop_n(dst.len(), n)?;
        for slot in dst.chunks_exact_mut(self.element_size).rev() {
            self.pop_unchecked(Some(slot));
        }
        Ok(())
    }

    /// Free every chunk and reset to empty. The stack stays usable.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.offset = 0;
        self.count = 0;
    }

    /// Number of elements on the stack.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bytes per element.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Usable bytes per chunk.
    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Elements per chunk.
    pub fn slots_per_chunk(&self) -> usize {
        self.chunk_capacity / self.element_size
    }

    /// Chunks currently resident, including a spent head awaiting release.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Bytes of chunk storage currently resident.
    pub fn memory_bytes(&self) -> usize {
        self.chunks.len() * self.chunk_capacity
    }

    /// Lifetime chunk allocation counters.
    pub fn stats(&self) -> StackStats {
        self.chunks.stats()
    }

    /// Diagnostic label given at construction.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Retract one element, releasing a spent head chunk first.
    ///
    /// Caller guarantees the stack is non-empty and `dst`, if any, is
    /// `element_size` bytes.
    fn pop_unchecked(&mut self, dst: Option<&mut [u8]>) {
        debug_assert!(self.count > 0, "pop on empty stack");
        if self.offset == 0 {
            // Free the old head before reading so nothing is read from it.
            self.chunks.pop_front();
            self.offset = self.chunk_capacity;
        }
        self.offset -= self.element_size;
        self.count -= 1;
        if let (Some(dst), Some(chunk)) = (dst, self.chunks.head()) {
            dst.copy_from_slice(&chunk.slots[self.offset..self.offset + self.element_size]);
        }
    }

    /// Chunk depth and end offset of the top element. A spent head puts the
    /// top at the end of the chunk behind it.
    fn top_position(&self) -> (usize, usize) {
        if self.offset == 0 {
            (1, self.chunk_capacity)
        } else {
            (0, self.offset)
        }
    }

    fn check_non_empty(&self) -> Result<(), StackError> {
        if self.count == 0 {
            return Err(StackError::EmptyStack);
        }
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), StackError> {
        if actual != self.element_size {
            return Err(StackError::ElementSizeMismatch {
                expected: self.element_size,
                actual,
            });
        }
        Ok(())
    }

    fn check_pop_n(&self, actual: usize, n: usize) -> Result<(), StackError> {
        if n > self.count {
            return Err(StackError::Underflow {
                requested: n,
                available: self.count,
            });
        }
        // n <= count, and count elements already fit in memory.
        let expected = n * self.element_size;
        if actual != expected {
            return Err(StackError::ElementSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedStack")
            .field("description", &self.description)
            .field("element_size", &self.element_size)
            .field("chunk_capacity", &self.chunk_capacity)
            .field("count", &self.count)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}
