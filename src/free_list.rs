use std::fmt;

use log::trace;

use crate::{Extent, error::InvariantError};

/// Identity tag of a free-list entry.
///
/// Shrinking an entry in place keeps its id; merging keeps the lower entry's
/// id and retires the absorbed one; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExtentId(u64);

#[derive(Debug, Clone)]
struct Entry {
  id: ExtentId,
  extent: Extent,
}

/// Free extents, sorted by start address.
#[derive(Debug, Clone)]
pub struct FreeList {
  entries: Vec<Entry>,
  next_id: u64,
}

impl FreeList {
  /// A list holding a single extent over `[0, capacity)`, or nothing when
  /// `capacity` is zero.
  pub(crate) fn new(capacity: usize) -> Self {
    let mut list = Self {
      entries: Vec::new(),
      next_id: 0,
    };
    list.reset(capacity);
    list
  }

  pub(crate) fn reset(
    &mut self,
    capacity: usize,
  ) {
    self.entries.clear();

    if capacity > 0 {
      let id = self.fresh_id();
      self.entries.push(Entry {
        id,
        extent: Extent::new(0, capacity),
      });
    }
  }

  fn fresh_id(&mut self) -> ExtentId {
    let id = ExtentId(self.next_id);
    self.next_id += 1;
    id
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(
    &self,
    index: usize,
  ) -> Option<Extent> {
    self.entries.get(index).map(|entry| entry.extent)
  }

  /// Free extents in ascending address order.
  pub fn iter(&self) -> impl Iterator<Item = Extent> + '_ {
    self.entries.iter().map(|entry| entry.extent)
  }

  /// Sum of all free extent sizes.
  pub fn total(&self) -> usize {
    self.iter().map(|extent| extent.size).sum()
  }

  /// Size of the largest free extent, zero when the list is empty.
  pub fn largest(&self) -> usize {
    self.iter().map(|extent| extent.size).max().unwrap_or(0)
  }

  pub(crate) fn id_at(
    &self,
    index: usize,
  ) -> Option<ExtentId> {
    self.entries.get(index).map(|entry| entry.id)
  }

  pub(crate) fn position_of(
    &self,
    id: ExtentId,
  ) -> Option<usize> {
    self.entries.iter().position(|entry| entry.id == id)
  }

  /// Carves `size` units off the low end of the entry at `index`.
  ///
  /// An exact fit removes the entry; otherwise it shrinks in place and keeps
  /// its slot and id. Returns the carved extent and the remainder, if any.
  pub(crate) fn take(
    &mut self,
    index: usize,
    size: usize,
  ) -> (Extent, Option<Extent>) {
    let (carved, rest) = self.entries[index].extent.carve(size);

    match rest {
      Some(rest) => self.entries[index].extent = rest,
      None => {
        self.entries.remove(index);
      }
    }

    (carved, rest)
  }

  /// Returns `extent` to the list at its address-ordered position, then
  /// coalesces.
  pub(crate) fn release(
    &mut self,
    extent: Extent,
  ) {
    let index = self
      .entries
      .iter()
      .position(|entry| entry.extent.start > extent.start)
      .unwrap_or(self.entries.len());

    let id = self.fresh_id();
    self.entries.insert(index, Entry { id, extent });

    let merged = self.coalesce();
    trace!("FreeList::release({extent}): inserted at slot {index}, {merged} merge(s)");
  }

  /// Merges directly adjacent entries until no adjacent pair remains.
  ///
  /// The lower entry of each pair absorbs the upper one and keeps its id.
  fn coalesce(&mut self) -> usize {
    let mut merged = 0;
    let mut index = 0;

    while index + 1 < self.entries.len() {
      let next = self.entries[index + 1].extent;

      if self.entries[index].extent.touches(&next) {
        self.entries[index].extent.size += next.size;
        self.entries.remove(index + 1);
        merged += 1;
      } else {
        index += 1;
      }
    }

    merged
  }

  /// Checks that entries are non-empty, sorted, disjoint and non-adjacent.
  pub(crate) fn check(&self) -> Result<(), InvariantError> {
    for entry in &self.entries {
      if entry.extent.size == 0 {
        return Err(InvariantError::EmptyExtent(entry.extent));
      }
    }

    for pair in self.entries.windows(2) {
      let (prev, next) = (pair[0].extent, pair[1].extent);

      if prev.end() > next.start {
        return Err(InvariantError::Unordered(prev, next));
      }
      if prev.touches(&next) {
        return Err(InvariantError::Uncoalesced(prev, next));
      }
    }

    Ok(())
  }
}

/// Renders the list as `[  0-  9]( 10) → [ 20- 99]( 80)`.
impl fmt::Display for FreeList {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    if self.is_empty() {
      return f.write_str("(empty)");
    }

    for (index, extent) in self.iter().enumerate() {
      if index > 0 {
        f.write_str(" → ")?;
      }
      write!(f, "{extent}")?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn extents(list: &FreeList) -> Vec<(usize, usize)> {
    list.iter().map(|extent| (extent.start, extent.size)).collect()
  }

  #[test]
  fn test_new_and_reset() {
    let mut list = FreeList::new(100);
    assert_eq!(extents(&list), vec![(0, 100)]);

    list.take(0, 40);
    list.reset(100);
    assert_eq!(extents(&list), vec![(0, 100)]);

    assert!(FreeList::new(0).is_empty());
  }

  #[test]
  fn test_take_keeps_id_on_split() {
    let mut list = FreeList::new(50);
    let id = list.id_at(0);

    let (carved, rest) = list.take(0, 20);

    assert_eq!(carved, Extent::new(0, 20));
    assert_eq!(rest, Some(Extent::new(20, 30)));
    assert_eq!(list.id_at(0), id);

    let (carved, rest) = list.take(0, 30);

    assert_eq!(carved, Extent::new(20, 30));
    assert_eq!(rest, None);
    assert!(list.is_empty());
  }

  #[test]
  fn test_release_sorts_and_coalesces() {
    let mut list = FreeList::new(100);
    list.take(0, 100);

    list.release(Extent::new(50, 10));
    list.release(Extent::new(10, 10));
    list.release(Extent::new(80, 20));
    assert_eq!(extents(&list), vec![(10, 10), (50, 10), (80, 20)]);

    // Bridges the gap between [10, 20) and [50, 60) in one pass.
    list.release(Extent::new(20, 30));
    assert_eq!(extents(&list), vec![(10, 50), (80, 20)]);

    list.release(Extent::new(60, 20));
    list.release(Extent::new(0, 10));
    assert_eq!(extents(&list), vec![(0, 100)]);
    assert_eq!(list.check(), Ok(()));
  }

  #[test]
  fn test_merge_keeps_lower_id() {
    let mut list = FreeList::new(30);
    list.take(0, 10);
    let upper = list.id_at(0).unwrap();

    list.release(Extent::new(0, 10));

    assert_eq!(extents(&list), vec![(0, 30)]);
    assert_eq!(list.position_of(upper), None);
  }

  #[test]
  fn test_totals() {
    let mut list = FreeList::new(40);
    list.take(0, 40);
    list.release(Extent::new(0, 5));
    list.release(Extent::new(20, 12));

    assert_eq!(list.total(), 17);
    assert_eq!(list.largest(), 12);
    assert_eq!(list.len(), 2);
  }

  #[test]
  fn test_display() {
    let mut list = FreeList::new(100);
    list.take(0, 10);
    list.release(Extent::new(0, 5));

    assert_eq!(list.to_string(), "[  0-  4](  5) → [ 10- 99]( 90)");

    list.reset(0);
    assert_eq!(list.to_string(), "(empty)");
  }

  /// Builds a list holding exactly `raw`, bypassing `release`.
  fn corrupted(raw: &[Extent]) -> FreeList {
    let mut list = FreeList::new(0);
    for &extent in raw {
      let id = list.fresh_id();
      list.entries.push(Entry { id, extent });
    }
    list
  }

  #[test]
  fn test_check_detects_corruption() {
    assert_eq!(FreeList::new(100).check(), Ok(()));

    let empty = corrupted(&[Extent::new(0, 5), Extent::new(10, 0)]);
    assert_eq!(empty.check(), Err(InvariantError::EmptyExtent(Extent::new(10, 0))));

    let unordered = corrupted(&[Extent::new(20, 5), Extent::new(0, 5)]);
    assert_eq!(
      unordered.check(),
      Err(InvariantError::Unordered(Extent::new(20, 5), Extent::new(0, 5)))
    );

    let overlapping = corrupted(&[Extent::new(0, 10), Extent::new(5, 10)]);
    assert_eq!(
      overlapping.check(),
      Err(InvariantError::Unordered(Extent::new(0, 10), Extent::new(5, 10)))
    );

    let adjacent = corrupted(&[Extent::new(0, 5), Extent::new(5, 5)]);
    assert_eq!(
      adjacent.check(),
      Err(InvariantError::Uncoalesced(Extent::new(0, 5), Extent::new(5, 5)))
    );
  }
}
