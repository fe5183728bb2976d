//! End-to-end chunk lifecycle checks through the public API.

use std::sync::{Arc, Mutex};
use std::thread;

use chunkstack::{ChunkedStack, StackConfig, StackError, TypedStack};

fn u64_stack(slots_per_chunk: usize) -> ChunkedStack {
    ChunkedStack::with_chunk_capacity(8, 8 * slots_per_chunk).unwrap()
}

fn pop_u64(stack: &mut ChunkedStack) -> u64 {
    let mut buf = [0u8; 8];
    stack.pop_into(&mut buf).unwrap();
    u64::from_le_bytes(buf)
}

#[test]
fn allocations_match_frees_over_many_cycles() {
    let mut stack = u64_stack(3);
    for round in 0..10u64 {
        for v in 0..(round * 7 + 1) {
            stack.push(&v.to_le_bytes()).unwrap();
        }
        while !stack.is_empty() {
            stack.discard().unwrap();
        }
        // Only the bottom chunk may survive a full drain.
        assert!(stack.chunk_count() <= 1);
    }
    stack.clear();
    let stats = stack.stats();
    assert_eq!(stats.chunks_allocated, stats.chunks_freed);
}

#[test]
fn resident_chunks_follow_the_top() {
    let mut stack = u64_stack(4);
    for v in 0..40u64 {
        stack.push(&v.to_le_bytes()).unwrap();
    }
    assert_eq!(stack.chunk_count(), 10);
    assert_eq!(stack.memory_bytes(), 10 * 32);

    for _ in 0..20 {
        stack.discard().unwrap();
    }
    // 20 left fill exactly 5 chunks; the emptied sixth is still resident.
    assert_eq!(stack.chunk_count(), 6);
    assert_eq!(pop_u64(&mut stack), 19);
    assert_eq!(stack.chunk_count(), 5);
}

#[test]
fn interleaved_push_pop_at_chunk_edge() {
    let mut stack = u64_stack(2);
    stack.push(&1u64.to_le_bytes()).unwrap();
    stack.push(&2u64.to_le_bytes()).unwrap();
    for v in 3..50u64 {
        stack.push(&v.to_le_bytes()).unwrap();
        assert_eq!(pop_u64(&mut stack), v);
        assert_eq!(stack.peek().unwrap(), &2u64.to_le_bytes());
    }
    // Bouncing across the edge reuses the spent chunk instead of allocating.
    assert_eq!(stack.stats().chunks_allocated, 2);
    assert_eq!(pop_u64(&mut stack), 2);
    assert_eq!(pop_u64(&mut stack), 1);
}

#[test]
fn structured_elements_round_trip() {
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Frame {
        node: u32,
        depth: u16,
        flags: u16,
    }

    fn encode(f: Frame) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&f.node.to_le_bytes());
        out[4..6].copy_from_slice(&f.depth.to_le_bytes());
        out[6..].copy_from_slice(&f.flags.to_le_bytes());
        out
    }

    fn decode(b: &[u8]) -> Frame {
        Frame {
            node: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            depth: u16::from_le_bytes([b[4], b[5]]),
            flags: u16::from_le_bytes([b[6], b[7]]),
        }
    }

    let config = StackConfig::new(8).chunk_capacity(24).description("dfs frames");
    let mut stack = ChunkedStack::from_config(config).unwrap();
    let frames: Vec<Frame> = (0..10)
        .map(|i| Frame {
            node: i * 3,
            depth: i as u16,
            flags: 0xA000 | i as u16,
        })
        .collect();
    for &f in &frames {
        stack.push_uninitialized().unwrap().copy_from_slice(&encode(f));
    }

    let mut out = vec![0u8; 8 * 10];
    stack.pop_n_reverse(&mut out, 10).unwrap();
    let decoded: Vec<Frame> = out.chunks_exact(8).map(decode).collect();
    assert_eq!(decoded, frames);
}

#[test]
fn pop_n_mismatched_buffer_is_rejected() {
    let mut stack = u64_stack(4);
    for v in 0..3u64 {
        stack.push(&v.to_le_bytes()).unwrap();
    }
    let mut out = [0u8; 20];
    assert_eq!(
        stack.pop_n(&mut out, 2),
        Err(StackError::ElementSizeMismatch {
            expected: 16,
            actual: 20,
        })
    );
    assert_eq!(stack.count(), 3);
}

#[test]
fn deep_stack_drops_without_overflow() {
    let mut stack = ChunkedStack::with_chunk_capacity(1, 1).unwrap();
    for i in 0..300_000u32 {
        stack.push(&[i as u8]).unwrap();
    }
    assert_eq!(stack.chunk_count(), 300_000);
    drop(stack);

    let mut typed = TypedStack::with_chunk_len(1);
    for i in 0..300_000u32 {
        typed.push(i).unwrap();
    }
    drop(typed);
}

#[test]
fn shared_behind_a_mutex() {
    let stack = Arc::new(Mutex::new(u64_stack(16)));
    let workers: Vec<_> = (0..4u64)
        .map(|t| {
            let stack = Arc::clone(&stack);
            thread::spawn(move || {
                for i in 0..250u64 {
                    let v = t * 1000 + i;
                    stack.lock().unwrap().push(&v.to_le_bytes()).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let mut stack = stack.lock().unwrap();
    assert_eq!(stack.count(), 1000);
    let mut seen = Vec::with_capacity(1000);
    while !stack.is_empty() {
        seen.push(pop_u64(&mut stack));
    }
    seen.sort_unstable();
    let mut expected: Vec<u64> = (0..4u64)
        .flat_map(|t| (0..250u64).map(move |i| t * 1000 + i))
        .collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}
