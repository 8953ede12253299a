use thiserror::Error;

use crate::{Extent, Handle};

/// Rejections returned by [`crate::Allocator`] operations.
///
/// "No fit" is deliberately absent: running out of a large enough extent is
/// reported as `Ok(None)` from `allocate`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  #[error("allocation size must be greater than zero")]
  InvalidSize,
  #[error("handle {0} is not a live allocation")]
  NotFound(Handle),
  #[error("handle {0} is already a live allocation")]
  HandleInUse(Handle),
}

/// A broken free-list or allocation-table invariant, reported by
/// [`crate::Allocator::verify`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
  #[error("free extent {0} is empty")]
  EmptyExtent(Extent),
  #[error("free extents {0} and {1} are out of order or overlap")]
  Unordered(Extent, Extent),
  #[error("free extents {0} and {1} are adjacent but not coalesced")]
  Uncoalesced(Extent, Extent),
  #[error("extent {0} lies outside [0, {1})")]
  OutOfBounds(Extent, usize),
  #[error("extent {0} overlaps extent {1}")]
  Overlap(Extent, Extent),
  #[error("free and allocated extents cover {covered} of {capacity} units")]
  Coverage { covered: usize, capacity: usize },
}

/// A result type for allocator operations.
pub type Result<T, E = AllocError> = std::result::Result<T, E>;
