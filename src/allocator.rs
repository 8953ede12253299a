use std::{collections::BTreeMap, fmt};

use log::{debug, trace};

use crate::{
  Extent,
  cursor::RovingCursor,
  error::{AllocError, InvariantError, Result},
  free_list::FreeList,
  stats::FragmentationStats,
  strategy::SearchMode,
};

/// Capacity used by [`Allocator::default`].
pub const DEFAULT_CAPACITY: usize = 100;

/// Opaque identifier of a live allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub u64);

impl fmt::Display for Handle {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
  pub handle: Handle,
  pub extent: Extent,
}

impl Allocation {
  /// Base address of the allocation.
  pub fn address(&self) -> usize {
    self.extent.start
  }
}

/// A successful operation, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Allocate {
    handle: Handle,
    extent: Extent,
    mode: SearchMode,
  },
  Free {
    handle: Handle,
    extent: Extent,
  },
}

/// Free-list allocator over the simulated address range `[0, capacity)`.
#[derive(Debug, Clone)]
pub struct Allocator {
  capacity: usize,
  mode: SearchMode,
  free: FreeList,
  allocations: BTreeMap<Handle, Extent>,
  cursor: RovingCursor,
  next_handle: u64,
  journal: Vec<Operation>,
}

impl Allocator {
  pub fn new(
    capacity: usize,
    mode: SearchMode,
  ) -> Self {
    debug!("Allocator::new({capacity}, {mode})");

    Self {
      capacity,
      mode,
      free: FreeList::new(capacity),
      allocations: BTreeMap::new(),
      cursor: RovingCursor::default(),
      next_handle: 0,
      journal: Vec::new(),
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn search_mode(&self) -> SearchMode {
    self.mode
  }

  /// Changes the mode used by [`Allocator::allocate`]. The free list and the
  /// roving cursor are left as they are.
  pub fn set_search_mode(
    &mut self,
    mode: SearchMode,
  ) {
    self.mode = mode;
  }

  /// Allocates `size` units with the configured search mode.
  ///
  /// See [`Allocator::allocate_with`].
  pub fn allocate(
    &mut self,
    size: usize,
    handle: Option<Handle>,
  ) -> Result<Option<Allocation>> {
    self.allocate_with(self.mode, size, handle)
  }

  /// Allocates `size` units from the low end of the extent `mode` selects.
  ///
  /// Returns:
  ///
  /// * `Ok(Some(_))`: the allocation, recorded under `handle` or under a
  ///   fresh handle when `handle` is `None`.
  ///
  /// * `Ok(None)`: no free extent is large enough. Nothing changes except
  ///   that a fresh handle, if one was drawn, stays consumed.
  ///
  /// * `Err(_)`: `size` is zero or `handle` is already live. Nothing changes.
  pub fn allocate_with(
    &mut self,
    mode: SearchMode,
    size: usize,
    handle: Option<Handle>,
  ) -> Result<Option<Allocation>> {
    trace!("Allocator::allocate_with({mode}, {size}, {handle:?})");

    if size == 0 {
      return Err(AllocError::InvalidSize);
    }
    if let Some(handle) = handle {
      if self.allocations.contains_key(&handle) {
        return Err(AllocError::HandleInUse(handle));
      }
    }

    let handle = handle.unwrap_or_else(|| self.fresh_handle());

    let from = self.cursor.resolve(&self.free);
    let Some(index) = mode.select(&self.free, size, from) else {
      trace!("Allocator::allocate_with: no fit for {size} in {}", self.free);
      return Ok(None);
    };

    let (extent, rest) = self.free.take(index, size);
    trace!("Allocator::allocate_with: {handle} -> {extent}, remainder {rest:?}");

    // The remainder keeps the slot on a split; on an exact fit the slot now
    // holds the following extent.
    if mode == SearchMode::NextFit {
      self.cursor.point_at(&self.free, index);
    }

    self.allocations.insert(handle, extent);
    self.journal.push(Operation::Allocate { handle, extent, mode });
    self.debug_verify();

    Ok(Some(Allocation { handle, extent }))
  }

  /// Returns the extent behind `handle` to the free list, coalescing it with
  /// its neighbours.
  pub fn free(
    &mut self,
    handle: Handle,
  ) -> Result<Extent> {
    trace!("Allocator::free({handle})");

    let extent = self
      .allocations
      .remove(&handle)
      .ok_or(AllocError::NotFound(handle))?;

    self.free.release(extent);
    self.cursor.revalidate(&self.free);

    self.journal.push(Operation::Free { handle, extent });
    self.debug_verify();

    Ok(extent)
  }

  /// Back to a single free extent over the whole capacity.
  pub fn reset(&mut self) {
    debug!("Allocator::reset(): dropping {} live allocation(s)", self.allocations.len());

    self.free.reset(self.capacity);
    self.allocations.clear();
    self.cursor.reset();
    self.next_handle = 0;
    self.journal.clear();
  }

  fn fresh_handle(&mut self) -> Handle {
    loop {
      let handle = Handle(self.next_handle);
      self.next_handle += 1;

      if !self.allocations.contains_key(&handle) {
        return handle;
      }
    }
  }

  pub fn free_list(&self) -> &FreeList {
    &self.free
  }

  /// Free extents in ascending address order.
  pub fn free_extents(&self) -> impl Iterator<Item = Extent> + '_ {
    self.free.iter()
  }

  pub fn snapshot_free_list(&self) -> Vec<Extent> {
    self.free.iter().collect()
  }

  pub fn allocation(
    &self,
    handle: Handle,
  ) -> Option<Extent> {
    self.allocations.get(&handle).copied()
  }

  /// Live allocations ordered by handle.
  pub fn allocations(&self) -> impl Iterator<Item = Allocation> + '_ {
    self
      .allocations
      .iter()
      .map(|(&handle, &extent)| Allocation { handle, extent })
  }

  /// The free extent where the next next-fit search would begin.
  pub fn roving_cursor(&self) -> Option<Extent> {
    self.free.get(self.cursor.resolve(&self.free))
  }

  pub fn capacity_used(&self) -> usize {
    self.allocations.values().map(|extent| extent.size).sum()
  }

  pub fn capacity_free(&self) -> usize {
    self.free.total()
  }

  pub fn stats(&self) -> FragmentationStats {
    FragmentationStats {
      capacity: self.capacity,
      used: self.capacity_used(),
      free: self.capacity_free(),
      free_extents: self.free.len(),
      largest_free: self.free.largest(),
      live_allocations: self.allocations.len(),
    }
  }

  /// Successful operations since creation or the last reset.
  pub fn journal(&self) -> &[Operation] {
    &self.journal
  }

  /// Checks every free-list and allocation-table invariant.
  ///
  /// Free extents must be non-empty, sorted, disjoint and non-adjacent, and
  /// together with the live allocations must cover `[0, capacity)` exactly.
  pub fn verify(&self) -> Result<(), InvariantError> {
    self.free.check()?;

    let mut extents: Vec<Extent> = self.free.iter().chain(self.allocations.values().copied()).collect();
    extents.sort_by_key(|extent| extent.start);

    let mut covered = 0;
    let mut prev: Option<Extent> = None;

    for extent in extents {
      if extent.end() > self.capacity {
        return Err(InvariantError::OutOfBounds(extent, self.capacity));
      }
      if let Some(prev) = prev.filter(|prev| prev.overlaps(&extent)) {
        return Err(InvariantError::Overlap(prev, extent));
      }

      covered += extent.size;
      prev = Some(extent);
    }

    if covered != self.capacity {
      return Err(InvariantError::Coverage {
        covered,
        capacity: self.capacity,
      });
    }

    Ok(())
  }

  fn debug_verify(&self) {
    debug_assert_eq!(self.verify(), Ok(()), "allocator invariants broken");
  }
}

impl Default for Allocator {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY, SearchMode::default())
  }
}
