//! # fitalloc - A Free-List Placement Simulator
//!
//! This crate simulates the classic free-list placement strategies
//! (**best-fit**, **worst-fit**, **next-fit** and **first-fit**) over a single
//! flat integer address range. Nothing is actually allocated: the allocator
//! hands out addresses in `[0, capacity)` so experiments can compare how each
//! strategy splits, reuses and fragments the same space.
//!
//! ## Overview
//!
//! The allocator owns a free list of extents kept sorted by address:
//!
//! ```text
//!   Address space, capacity 100:
//!
//!   0        10   15                    40                             100
//!   ┌────────┬────┬─────────────────────┬───────────────────────────────┐
//!   │ free   │ #1 │        free         │              #2               │
//!   └────────┴────┴─────────────────────┴───────────────────────────────┘
//!
//!   Free list:  [  0-  9]( 10) → [ 15- 39]( 25)
//!   Table:      #1 → (10, 5)   #2 → (40, 60)
//! ```
//!
//! Free extents plus live allocations always partition `[0, capacity)`
//! exactly, and no two free extents touch.
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── allocator  - Allocator, handles, allocation table, journal
//!   ├── cursor     - next-fit roving cursor (internal)
//!   ├── error      - AllocError, InvariantError
//!   ├── extent     - Extent, a half-open address range
//!   ├── free_list  - sorted free list with coalescing
//!   ├── stats      - FragmentationStats
//!   └── strategy   - SearchMode and the placement searches
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::{Allocator, SearchMode};
//!
//! let mut allocator = Allocator::new(100, SearchMode::BestFit);
//!
//! let first = allocator.allocate(10, None).unwrap().unwrap();
//! let second = allocator.allocate(5, None).unwrap().unwrap();
//! assert_eq!((first.address(), second.address()), (0, 10));
//!
//! allocator.free(first.handle).unwrap();
//!
//! // Best-fit reuses the 10-unit hole and leaves [8, 10) free.
//! let third = allocator.allocate(8, None).unwrap().unwrap();
//! assert_eq!(third.address(), 0);
//! assert_eq!(allocator.free_list().to_string(), "[  8-  9](  2) → [ 15- 99]( 85)");
//! ```
//!
//! ## How It Works
//!
//! Allocation carves the request off the **low end** of the chosen extent:
//!
//! ```text
//!   Split (request 8 from a 10-unit extent):
//!
//!   before  ┌───────────────────┐
//!           │ free  [0, 10)     │
//!           └───────────────────┘
//!   after   ┌───────────────┬───┐
//!           │ #3  [0, 8)    │ f │  ← remainder [8, 10) keeps its list slot
//!           └───────────────┴───┘
//! ```
//!
//! An exact fit removes the extent from the list. Freeing inserts the extent
//! at its address-ordered position and merges it with any neighbour it
//! touches:
//!
//! ```text
//!   Coalesce (free #1 = [10, 15)):
//!
//!   ┌────────┬────┬─────────┐        ┌─────────────────────────┐
//!   │ free   │ #1 │  free   │   →    │          free           │
//!   └────────┴────┴─────────┘        └─────────────────────────┘
//!   0        10   15       40        0                        40
//! ```
//!
//! Which extent gets split depends on the [`SearchMode`]:
//!
//! ```text
//!   Free list sizes:   [ 7 ] → [ 3 ] → [ 12 ]       request 5
//!
//!   best-fit    smallest extent that fits     → [ 7 ]
//!   worst-fit   largest extent                → [ 12 ]
//!   first-fit   first from the head           → [ 7 ]
//!   next-fit    first from the roving cursor  → depends on history
//! ```
//!
//! Next-fit keeps a roving cursor between calls. It names a free extent by
//! list slot and identity, so when that extent is merged away or consumed
//! the search falls back to the head of the list instead of following a stale
//! position. Each search examines every extent at most once.
//!
//! ## Outcomes
//!
//! - `allocate` returns `Ok(Some(allocation))`, `Ok(None)` when no extent is
//!   large enough (fragmentation is an expected result, not an error), or
//!   [`AllocError::InvalidSize`] / [`AllocError::HandleInUse`].
//! - `free` returns the released extent or [`AllocError::NotFound`] for an
//!   unknown handle, leaving state untouched.
//! - Every rejection is decided before any state changes.
//!
//! ## Logging
//!
//! Operations are traced through the [`log`] facade (`debug` for lifecycle,
//! `trace` for every placement decision). Install any logger to see them.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: every mutation takes `&mut self`; share an
//!   instance behind your own lock
//! - **Simulation only**: addresses are plain integers, no memory is touched
//! - **No alignment or headers**: a request for `n` units uses exactly `n`

mod allocator;
mod cursor;
pub mod error;
mod extent;
mod free_list;
mod stats;
mod strategy;

pub use allocator::{Allocation, Allocator, DEFAULT_CAPACITY, Handle, Operation};
pub use error::{AllocError, InvariantError, Result};
pub use extent::Extent;
pub use free_list::FreeList;
pub use stats::FragmentationStats;
pub use strategy::{ParseSearchModeError, SearchMode};
