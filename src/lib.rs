//! # fitalloc - A Free-List Memory Allocator Library
//!
//! This crate provides a **free-list allocator** in Rust: one heap that only
//! grows, carved into blocks that are handed out, released, split, merged and
//! reused according to a configurable fit policy.
//!
//! ## Overview
//!
//! ```text
//!   Free-List Allocator Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌────┬──────┬────┬──────┬────┬──────┬────┬──────┐                  │
//!   │   │ H  │  A1  │ H  │ free │ H  │  A3  │ H  │ free │                  │
//!   │   └────┴──────┴────┴──────┴────┴──────┴────┴──────┘                  │
//!   │     │           ▲ │           ▲ │           ▲                   ▲    │
//!   │     └───────────┘ └───────────┘ └───────────┘                   │    │
//!   │          next          next          next                    Top of  │
//!   │                                                               heap   │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Every block, free or not, sits on one list in address order.
//!   Allocation reuses a free block if the fit policy finds one,
//!   otherwise the heap grows and a new block is appended.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Alignment macro (align!)
//!   ├── allocator  - FitAllocator: allocate, release, reallocate, zero_allocate
//!   ├── block      - Block header and list walking
//!   ├── error      - HeapError
//!   ├── ffi        - malloc/free/realloc/calloc exports (feature "preload")
//!   ├── fit        - SearchMode: first, best, worst and next fit
//!   ├── grow       - Heap growth (internal)
//!   ├── source     - HeapSource: sbrk and mmap backed heaps
//!   └── stats      - Statistics counters and report
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fitalloc::{FitAllocator, MappedRegion, SearchMode};
//!
//! let region = MappedRegion::new(1 << 20).unwrap();
//! let mut allocator = FitAllocator::with_source(SearchMode::BestFit, region);
//!
//! unsafe {
//!     let ptr = allocator.allocate(8) as *mut u32;
//!     *ptr = 42;
//!     println!("Value: {}", *ptr);
//!
//!     let ptr = allocator.reallocate(ptr.cast(), 4096);
//!     allocator.release(ptr);
//! }
//!
//! println!("{}", allocator.stats());
//! ```
//!
//! ## How It Works
//!
//! Each block is a header followed by the caller's bytes:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ next: ptr/null  │  │  │                          │  │
//!   │  │ is_free: bool   │  │  │  N bytes, N % 4 == 0     │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   │   HEADER_SIZE bytes   │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! Splitting a free block that is larger than needed:
//!
//! ```text
//!   ┌───┬────────────────────────────┐      ┌───┬────────┬───┬───────────┐
//!   │ H │          free (C)          │  ->  │ H │ used S │ H │ free      │
//!   └───┴────────────────────────────┘      └───┴────────┴───┴───────────┘
//!                                                         C - S - HEADER_SIZE
//! ```
//!
//! Releasing merges each free block with a free successor in one pass:
//!
//! ```text
//!   ┌───┬────────┬───┬────────┐      ┌───┬─────────────────────────┐
//!   │ H │ free A │ H │ free B │  ->  │ H │ free A + B + HEADER_SIZE │
//!   └───┴────────┴───┴────────┘      └───┴─────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Four fit policies**: first, best, worst and next fit, chosen per allocator
//! - **Splitting and coalescing**: large free blocks are carved, neighbours merged
//! - **In-place reallocation**: shrinking never moves, growing the last block
//!   extends the heap under it
//! - **Statistics**: nine counters describing what the allocator did
//! - **Drop-in C allocator**: `malloc`/`free`/`realloc`/`calloc` behind the
//!   `preload` feature
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **No shrinking**: Memory is never returned to the OS
//! - **4-byte alignment**: Payloads are aligned to 4 bytes, nothing more
//! - **Single-pass coalescing**: A release may leave runs of three or more
//!   free blocks partially merged
//! - **Unix-only**: Requires `libc`, `sbrk` and `mmap` (POSIX systems)
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! All allocation and deallocation operations require `unsafe` blocks.

pub mod align;
mod allocator;
mod block;
mod error;
#[cfg(feature = "preload")]
pub mod ffi;
mod fit;
mod grow;
mod source;
mod stats;

pub use allocator::FitAllocator;
pub use block::{BlockInfo, Blocks, HEADER_SIZE};
pub use error::HeapError;
pub use fit::{ParseSearchModeError, SearchMode};
pub use source::{HeapSource, MappedRegion, Sbrk};
pub use stats::Statistics;
