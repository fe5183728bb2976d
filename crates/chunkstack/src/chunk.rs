//! Fixed-capacity chunks and the owning chunk list.
//!
//! A [`Chunk`] is a `Vec<T>` reserved to its full capacity up front plus an
//! owned link to the next-older chunk. A [`ChunkList`] owns the newest chunk
//! and, through the links, every chunk behind it. Chunks are never shared
//! and the list is never cyclic.

use std::mem;

use crate::error::StackError;

/// Allocation counters for a stack's chunk list.
///
/// Every chunk linked in increments `chunks_allocated`; every chunk released
/// (by a pop crossing a chunk boundary, `clear`, or drop of the stack)
/// increments `chunks_freed`. The difference is the resident chunk count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackStats {
    /// Total chunks allocated over the stack's lifetime.
    pub chunks_allocated: u64,
    /// Total chunks released over the stack's lifetime.
    pub chunks_freed: u64,
}

impl StackStats {
    /// Chunks currently resident.
    pub fn resident(&self) -> u64 {
        self.chunks_allocated - self.chunks_freed
    }
}

/// A single block of storage for up to `capacity` elements.
pub(crate) struct Chunk<T> {
    /// Backing storage. Reserved to full capacity at creation and never
    /// grown past it.
    pub(crate) slots: Vec<T>,
    /// Next-older chunk.
    next: Option<Box<Chunk<T>>>,
}

impl<T> Chunk<T> {
    /// Reserve storage for `capacity` elements without panicking on OOM.
    fn try_with_capacity(capacity: usize) -> Result<Self, StackError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| StackError::AllocationFailed {
                bytes: capacity.saturating_mul(mem::size_of::<T>()),
            })?;
        Ok(Self { slots, next: None })
    }
}

/// Singly linked list of chunks, newest first.
pub(crate) struct ChunkList<T> {
    head: Option<Box<Chunk<T>>>,
    len: usize,
    stats: StackStats,
}

impl<T> ChunkList<T> {
    pub(crate) const fn new() -> Self {
        Self {
            head: None,
            len: 0,
            stats: StackStats {
                chunks_allocated: 0,
                chunks_freed: 0,
            },
        }
    }

    /// Return the head chunk when `reuse_head` is set and a head exists,
    /// otherwise link a freshly reserved chunk of `capacity` slots as the
    /// new head.
    ///
    /// On allocation failure the list is unchanged.
    pub(crate) fn head_or_grow(
        &mut self,
        reuse_head: bool,
        capacity: usize,
    ) -> Result<&mut Chunk<T>, StackError> {
        if !reuse_head {
            return self.grow(capacity);
        }
        match self.head {
            Some(ref mut chunk) => Ok(&mut **chunk),
            None => self.grow(capacity),
        }
    }

    fn grow(&mut self, capacity: usize) -> Result<&mut Chunk<T>, StackError> {
        let mut chunk = Box::new(Chunk::try_with_capacity(capacity)?);
        chunk.next = self.head.take();
        self.len += 1;
        self.stats.chunks_allocated += 1;
        Ok(&mut **self.head.insert(chunk))
    }

    /// Free the head chunk and promote its successor.
    ///
    /// Returns `false` if the list was already empty.
    pub(crate) fn pop_front(&mut self) -> bool {
        match self.head.take() {
            Some(mut old) => {
                // Detach before the box drops so the drop never recurses.
                self.head = old.next.take();
                self.len -= 1;
                self.stats.chunks_freed += 1;
                true
            }
            None => false,
        }
    }

    /// Free every chunk, newest first.
    pub(crate) fn clear(&mut self) {
        while self.pop_front() {}
    }

    pub(crate) fn head(&self) -> Option<&Chunk<T>> {
        self.head.as_deref()
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut Chunk<T>> {
        self.head.as_deref_mut()
    }

    /// The chunk `n` links behind the head.
    pub(crate) fn nth(&self, n: usize) -> Option<&Chunk<T>> {
        let mut cur = self.head.as_deref();
        for _ in 0..n {
            cur = cur?.next.as_deref();
        }
        cur
    }

    /// Mutable access to the chunk `n` links behind the head.
    pub(crate) fn nth_mut(&mut self, n: usize) -> Option<&mut Chunk<T>> {
        let mut cur = self.head.as_deref_mut();
        for _ in 0..n {
            cur = cur?.next.as_deref_mut();
        }
        cur
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn stats(&self) -> StackStats {
        self.stats
    }
}

impl<T> Drop for ChunkList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}
