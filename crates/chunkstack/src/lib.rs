//! Chunked LIFO stack with fixed-size elements.
//!
//! Elements live in contiguous chunks that are allocated on demand and
//! released as the stack shrinks. Pushing never moves existing elements and
//! never allocates per element: one chunk allocation serves
//! `chunk_capacity / element_size` pushes.
//!
//! # Architecture
//!
//! ```text
//! ChunkedStack (byte elements, size fixed at runtime)
//! TypedStack<T> (owned T values)
//! └── ChunkList (owning singly linked list, newest first)
//!     └── Chunk → Chunk → ... (Vec reserved to full capacity + next link)
//! ```
//!
//! # Chunk lifetime
//!
//! - **Allocate:** on push, when there is no chunk or the head is full.
//! - **Free:** on the pop *after* the one that emptied the head chunk. The
//!   spent chunk is released, the next-older chunk (always full) becomes the
//!   head, and the pop retracts from it.
//! - **Release all:** `clear` and drop.
//!
//! Neither stack is synchronised. Wrap a stack in a single `Mutex` when it
//! must be shared between threads.
//!
//! # Example
//!
//! ```rust
//! use chunkstack::ChunkedStack;
//!
//! let mut stack = ChunkedStack::new(4).unwrap();
//! for v in [10u32, 20, 30] {
//!     stack.push(&v.to_ne_bytes()).unwrap();
//! }
//! assert_eq!(stack.peek().unwrap(), &30u32.to_ne_bytes());
//!
//! let mut out = [0u8; 4];
//! stack.pop_into(&mut out).unwrap();
//! assert_eq!(u32::from_ne_bytes(out), 30);
//! assert_eq!(stack.count(), 2);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod chunk;
pub mod config;
pub mod error;
pub mod stack;
pub mod typed;

// Public re-exports for the primary API surface.
pub use chunk::StackStats;
pub use config::StackConfig;
pub use error::StackError;
pub use stack::ChunkedStack;
pub use typed::TypedStack;
