//! Benchmark workloads for the chunkstack crate.
//!
//! Provides deterministic workloads shared by the Criterion benches:
//!
//! - [`fill_and_drain`]: push `n` elements, then pop them all
//! - [`sawtooth`]: oscillate the top around a chunk boundary
//! - [`dfs_visit_count`]: depth-first walk of an implicit tree using a
//!   byte stack of `(node, depth)` frames

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use chunkstack::{ChunkedStack, StackError};

/// Size of one DFS frame: `node: u32` then `depth: u32`.
pub const FRAME_BYTES: usize = 8;

/// Push `n` little-endian `u64` values, then pop them all, returning the
/// XOR of everything popped.
pub fn fill_and_drain(stack: &mut ChunkedStack, n: u64) -> Result<u64, StackError> {
    for v in 0..n {
        stack.push(&v.to_le_bytes())?;
    }
    let mut acc = 0u64;
    let mut buf = [0u8; 8];
    while !stack.is_empty() {
        stack.pop_into(&mut buf)?;
        acc ^= u64::from_le_bytes(buf);
    }
    Ok(acc)
}

/// Keep the top within `swing` elements above a chunk boundary for
/// `rounds` up-down cycles. Exercises the spent-chunk path.
pub fn sawtooth(stack: &mut ChunkedStack, swing: usize, rounds: usize) -> Result<(), StackError> {
    let element = vec![0xA5u8; stack.element_size()];
    let base = stack.slots_per_chunk();
    for _ in 0..base {
        stack.push(&element)?;
    }
    for _ in 0..rounds {
        for _ in 0..swing {
            stack.push(&element)?;
        }
        for _ in 0..swing {
            stack.discard()?;
        }
    }
    stack.clear();
    Ok(())
}

/// Visit every node of a complete tree with `fanout` children per node and
/// `max_depth` levels below the root, returning the number of nodes seen.
pub fn dfs_visit_count(
    stack: &mut ChunkedStack,
    fanout: u32,
    max_depth: u32,
) -> Result<u64, StackError> {
    debug_assert_eq!(stack.element_size(), FRAME_BYTES);
    stack.push(&encode_frame(0, 0))?;
    let mut visited = 0u64;
    let mut frame = [0u8; FRAME_BYTES];
    while !stack.is_empty() {
        stack.pop_into(&mut frame)?;
        let (node, depth) = decode_frame(&frame);
        visited += 1;
        if depth < max_depth {
            for child in 0..fanout {
                let id = node.wrapping_mul(fanout).wrapping_add(child + 1);
                stack.push(&encode_frame(id, depth + 1))?;
            }
        }
    }
    Ok(visited)
}

/// Number of nodes in a complete tree, for checking [`dfs_visit_count`].
pub fn tree_size(fanout: u32, max_depth: u32) -> u64 {
    (0..=max_depth).map(|d| u64::from(fanout).pow(d)).sum()
}

fn encode_frame(node: u32, depth: u32) -> [u8; FRAME_BYTES] {
    let mut out = [0u8; FRAME_BYTES];
    out[..4].copy_from_slice(&node.to_le_bytes());
    out[4..].copy_from_slice(&depth.to_le_bytes());
    out
}

fn decode_frame(frame: &[u8; FRAME_BYTES]) -> (u32, u32) {
    let node = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let depth = u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]);
    (node, depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_drain_sees_every_value() {
        let mut stack = ChunkedStack::with_chunk_capacity(8, 64).unwrap();
        let expected = (0..100u64).fold(0, |acc, v| acc ^ v);
        assert_eq!(fill_and_drain(&mut stack, 100).unwrap(), expected);
        assert!(stack.is_empty());
    }

    #[test]
    fn sawtooth_reuses_one_extra_chunk() {
        let mut stack = ChunkedStack::with_chunk_capacity(4, 16).unwrap();
        sawtooth(&mut stack, 3, 50).unwrap();
        assert_eq!(stack.stats().chunks_allocated, 2);
        assert_eq!(stack.stats().resident(), 0);
    }

    #[test]
    fn dfs_visits_whole_tree() {
        let mut stack = ChunkedStack::with_chunk_capacity(FRAME_BYTES, FRAME_BYTES * 4).unwrap();
        assert_eq!(dfs_visit_count(&mut stack, 3, 5).unwrap(), tree_size(3, 5));
        assert_eq!(tree_size(3, 5), 364);
    }
}
