//! Statically typed chunked stack.
//!
//! [`TypedStack<T>`] applies the same chunk policy as
//! [`ChunkedStack`](crate::ChunkedStack) to values of a concrete type:
//! each chunk is a `Vec<T>` reserved to `chunk_len` elements, and the
//! chunk's length plays the role of the byte offset. Values are moved in
//! and out, so `T` needs no `Copy` bound and is dropped normally.

use std::fmt;

use crate::chunk::{ChunkList, StackStats};
use crate::config::StackConfig;
use crate::error::StackError;

/// A LIFO stack of `T` stored in lazily allocated, fixed-length chunks.
pub struct TypedStack<T> {
    chunk_len: usize,
    len: usize,
    chunks: ChunkList<T>,
    description: Option<String>,
}

impl<T> TypedStack<T> {
    /// Create an empty stack with 1024 elements per chunk.
    pub fn new() -> Self {
        Self::with_chunk_len(StackConfig::DEFAULT_CHUNK_ELEMENTS)
    }

    /// Create an empty stack with `chunk_len` elements per chunk.
    ///
    /// A `chunk_len` of zero selects the default.
    pub fn with_chunk_len(chunk_len: usize) -> Self {
        let chunk_len = if chunk_len == 0 {
            StackConfig::DEFAULT_CHUNK_ELEMENTS
        } else {
            chunk_len
        };
        Self {
            chunk_len,
            len: 0,
            chunks: ChunkList::new(),
            description: None,
        }
    }

    /// Attach a diagnostic label.
    pub fn with_description(mut self, label: impl Into<String>) -> Self {
        self.description = Some(label.into());
        self
    }

    /// Push `value` on top.
    ///
    /// Fails only if a new chunk is needed and cannot be reserved, in which
    /// case `value` is dropped and the stack is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        let has_room = self
            .chunks
            .head()
            .is_some_and(|chunk| chunk.slots.len() < self.chunk_len);
        let chunk = self.chunks.head_or_grow(has_room, self.chunk_len)?;
        chunk.slots.push(value);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the top value, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        if self.chunks.head().is_some_and(|chunk| chunk.slots.is_empty()) {
            self.chunks.pop_front();
        }
        let value = self.chunks.head_mut()?.slots.pop();
        debug_assert!(value.is_some(), "non-empty stack had an empty top chunk");
        if value.is_some() {
            self.len -= 1;
        }
        value
    }

    /// Drop the top value. Returns `false` if the stack was empty.
    pub fn discard(&mut self) -> bool {
        self.pop().is_some()
    }

    /// Borrow the top value.
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.chunks.nth(self.top_depth())?.slots.last()
    }

    /// Mutably borrow the top value.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            return None;
        }
        let depth = self.top_depth();
        self.chunks.nth_mut(depth)?.slots.last_mut()
    }

    /// Pop `n` values, returned in pop order (former top first).
    ///
    /// Nothing is popped unless all `n` are available.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<T>, StackError> {
        if n > self.len {
            return Err(StackError::Underflow {
                requested: n,
                available: self.len,
            });
        }
        let mut out = Vec::with_capacity(n);
        out.extend(std::iter::from_fn(|| self.pop()).take(n));
        Ok(out)
    }

    /// Pop `n` values, returned in push order (oldest of the `n` first).
    pub fn pop_n_reverse(&mut self, n: usize) -> Result<Vec<T>, StackError> {
        let mut out = self.pop_n(n)?;
        out.reverse();
        Ok(out)
    }

    /// Drop every value and free every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    /// Number of values on the stack.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements per chunk.
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Chunks currently resident.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Lifetime chunk allocation counters.
    pub fn stats(&self) -> StackStats {
        self.chunks.stats()
    }

    /// Diagnostic label, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// An emptied head chunk is kept until the next pop; the top then
    /// lives one chunk further down.
    fn top_depth(&self) -> usize {
        match self.chunks.head() {
            Some(chunk) if chunk.slots.is_empty() => 1,
            _ => 0,
        }
    }
}

impl<T> Default for TypedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedStack")
            .field("description", &self.description)
            .field("chunk_len", &self.chunk_len)
            .field("len", &self.len)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn lifo_order() {
        let mut stack = TypedStack::with_chunk_len(2);
        for v in 1..=5 {
            stack.push(v).unwrap();
        }
        let popped: Vec<_> = std::iter::from_fn(|| stack.pop()).collect();
        assert_eq!(popped, vec![5, 4, 3, 2, 1]);
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn zero_chunk_len_uses_default() {
        let stack: TypedStack<u8> = TypedStack::with_chunk_len(0);
        assert_eq!(stack.chunk_len(), 1024);
    }

    #[test]
    fn chunk_boundary_crossing() {
        let mut stack = TypedStack::with_chunk_len(2);
        for v in 1..=5u32 {
            stack.push(v).unwrap();
        }
        assert_eq!(stack.stats().chunks_allocated, 3);
        assert_eq!(stack.pop(), Some(5));
        // Emptied chunk still resident; peek looks through it.
        assert_eq!(stack.chunk_count(), 3);
        assert_eq!(stack.peek(), Some(&4));
        assert_eq!(stack.pop(), Some(4));
        assert_eq!(stack.chunk_count(), 2);
        while stack.discard() {}
        stack.clear();
        assert_eq!(stack.stats().chunks_freed, 3);
    }

    #[test]
    fn emptied_head_reused_by_push() {
        let mut stack = TypedStack::with_chunk_len(2);
        for v in 1..=3 {
            stack.push(v).unwrap();
        }
        stack.pop();
        stack.push(9).unwrap();
        assert_eq!(stack.stats().chunks_allocated, 2);
        assert_eq!(stack.pop_n(3).unwrap(), vec![9, 2, 1]);
    }

    #[test]
    fn peek_mut_edits_top() {
        let mut stack = TypedStack::with_chunk_len(2);
        stack.push(String::from("a")).unwrap();
        stack.push(String::from("b")).unwrap();
        stack.push(String::from("c")).unwrap();
        stack.pop();
        stack.peek_mut().unwrap().push('!');
        assert_eq!(stack.pop().as_deref(), Some("b!"));
    }

    #[test]
    fn pop_n_and_reverse() {
        let mut stack = TypedStack::new();
        for c in ['A', 'B', 'C'] {
            stack.push(c).unwrap();
        }
        assert_eq!(stack.pop_n(3).unwrap(), vec!['C', 'B', 'A']);

        for c in ['A', 'B', 'C'] {
            stack.push(c).unwrap();
        }
        assert_eq!(stack.pop_n_reverse(3).unwrap(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn pop_n_underflow_pops_nothing() {
        let mut stack = TypedStack::new();
        stack.push(1).unwrap();
        assert_eq!(
            stack.pop_n(2),
            Err(StackError::Underflow {
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn clear_and_drop_release_values() {
        let tracker = Rc::new(());
        let mut stack = TypedStack::with_chunk_len(3);
        for _ in 0..7 {
            stack.push(Rc::clone(&tracker)).unwrap();
        }
        assert_eq!(Rc::strong_count(&tracker), 8);
        stack.clear();
        assert_eq!(Rc::strong_count(&tracker), 1);
        assert!(stack.is_empty());

        stack.push(Rc::clone(&tracker)).unwrap();
        drop(stack);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn zero_sized_values() {
        let mut stack = TypedStack::with_chunk_len(4);
        for _ in 0..10 {
            stack.push(()).unwrap();
        }
        assert_eq!(stack.len(), 10);
        assert_eq!(stack.chunk_count(), 3);
        assert_eq!(stack.pop_n(10).unwrap().len(), 10);
    }

    #[test]
    fn debug_output() {
        let stack: TypedStack<u8> = TypedStack::new().with_description("frontier");
        let text = format!("{stack:?}");
        assert!(text.contains("frontier"));
        assert_eq!(stack.description(), Some("frontier"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn matches_vec_model(
                chunk_len in 1usize..5,
                ops in proptest::collection::vec(proptest::option::of(any::<i64>()), 0..200),
            ) {
                let mut stack = TypedStack::with_chunk_len(chunk_len);
                let mut model = Vec::new();
                for op in ops {
                    match op {
                        Some(v) => {
                            stack.push(v).unwrap();
                            model.push(v);
                        }
                        None => {
                            prop_assert_eq!(stack.pop(), model.pop());
                        }
                    }
                    prop_assert_eq!(stack.len(), model.len());
                    prop_assert_eq!(stack.peek(), model.last());
                }
            }
        }
    }
}
