//! # blockalloc - A Fixed-Capacity Block Allocator Library
//!
//! This crate provides a **first-fit block allocator** over a single
//! fixed-size arena. The arena never grows: every allocation is carved
//! out of one pre-sized byte buffer owned by the allocator instance.
//!
//! ## Overview
//!
//! The whole arena is tiled by blocks, each a small header followed by
//! its payload:
//!
//! ```text
//!   Arena Layout (capacity = SIZE bytes):
//!
//!   ┌────┬──────────────┬────┬────────┬────┬──────────────────────────┐
//!   │ H  │  used (100)  │ H  │ used   │ H  │        free              │
//!   └────┴──────────────┴────┴────────┴────┴──────────────────────────┘
//!   ▲                                                                 ▲
//!   └ arena start                                         arena end ──┘
//!
//!   H = 4 byte header: 1 free/used bit + 31 bit payload size.
//!   The next block starts at this header + 4 + size, so the chain is
//!   computed, never stored. The chain always lands exactly on the
//!   arena end.
//! ```
//!
//! Allocation scans the chain for the first free block that fits and
//! splits it, leaving the excess as a new free block (unless the
//! leftover is too small to hold a header plus a usable payload, in
//! which case it is absorbed). Releasing marks the block free and
//! merges it with free neighbours, so adjacent free blocks never
//! coexist:
//!
//! ```text
//!   release(B):
//!
//!   before  ┌────┬─ free ─┬────┬── B ──┬────┬─ free ─┐
//!   after   ┌────┬───────────── free ──────────────── ┐
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   blockalloc
//!   ├── align      - payload alignment helper (internal)
//!   ├── block      - packed block header record
//!   └── arena      - BlockAllocator implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use blockalloc::BlockAllocator;
//!
//! // An allocator over a 2048 byte arena.
//! let mut alloc = BlockAllocator::<2048>::new();
//!
//! // Typed allocation: the value is placed inside the arena.
//! let value = alloc.construct(42u64).expect("arena exhausted");
//! assert_eq!(unsafe { *value.as_ref() }, 42);
//!
//! // Raw allocation: plain bytes, no construction.
//! let bytes = alloc.allocate(128).expect("arena exhausted");
//!
//! alloc.deallocate(bytes.as_ptr());
//! unsafe { alloc.destroy(value.as_ptr()) };
//! ```
//!
//! ## Design Notes
//!
//! - **Deterministic and bounded**: every operation is one linear walk
//!   over the current block chain, with no syscalls, no heap growth
//!   and no hidden amortization. Suited to embedded or
//!   latency-sensitive code that pre-sizes its memory up front.
//! - **Offset-addressed**: blocks are addressed by byte offset into
//!   the owned buffer and every computed offset is bounds-checked, so
//!   a corrupted chain can never read or write outside the arena.
//! - **O(1) metadata, O(n) operations**: headers store no
//!   back-pointers; finding a block's predecessor rescans from the
//!   arena start.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no locks, no atomics. Wrap the
//!   allocator in external synchronization to share it.
//! - **No resizing**: the arena capacity is fixed at construction;
//!   there is no `realloc`/`calloc` equivalent and no array-form typed
//!   allocation.
//! - **Capacity cap**: the 31 bit size field limits the arena (and any
//!   allocation) to under 2^31 bytes.
//! - **Foreign pointers are ignored**: releasing a pointer from
//!   outside the arena is a silent no-op, and the typed release path
//!   still runs the destructor first. See
//!   [`BlockAllocator::deallocate`] and [`BlockAllocator::destroy`].

mod align;
mod arena;
mod block;

pub use arena::{BlockAllocator, Blocks, MAX_ALIGN};
pub use block::{HEADER_SIZE, Header, MAX_BLOCK_SIZE};

/// Crate version, exposed for consumers that report it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_matches_the_manifest() {
    assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!VERSION.is_empty());
  }
}
