use std::fmt;

/// Point-in-time fragmentation figures for an allocator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentationStats {
  pub capacity: usize,
  pub used: usize,
  pub free: usize,
  pub free_extents: usize,
  pub largest_free: usize,
  pub live_allocations: usize,
}

impl FragmentationStats {
  /// External fragmentation as `1 - largest_free / free`.
  ///
  /// Zero when nothing is free or all free space is one extent; approaches one
  /// as free space scatters into small pieces.
  pub fn external_fragmentation(&self) -> f64 {
    if self.free == 0 {
      return 0.0;
    }

    1.0 - self.largest_free as f64 / self.free as f64
  }

  /// True when enough space is free in total but no single extent can hold
  /// `size`.
  pub fn is_fragmented_for(
    &self,
    size: usize,
  ) -> bool {
    self.free >= size && self.largest_free < size
  }
}

impl fmt::Display for FragmentationStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{} free extent(s), {} of {} units free, largest {}, {} live, fragmentation {:.2}",
      self.free_extents,
      self.free,
      self.capacity,
      self.largest_free,
      self.live_allocations,
      self.external_fragmentation(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stats(
    free: usize,
    largest_free: usize,
  ) -> FragmentationStats {
    FragmentationStats {
      capacity: 100,
      used: 100 - free,
      free,
      free_extents: 0,
      largest_free,
      live_allocations: 0,
    }
  }

  #[test]
  fn test_external_fragmentation() {
    assert_eq!(stats(0, 0).external_fragmentation(), 0.0);
    assert_eq!(stats(40, 40).external_fragmentation(), 0.0);
    assert_eq!(stats(40, 10).external_fragmentation(), 0.75);
  }

  #[test]
  fn test_is_fragmented_for() {
    assert!(stats(30, 12).is_fragmented_for(25));
    assert!(!stats(30, 25).is_fragmented_for(25));
    assert!(!stats(20, 12).is_fragmented_for(25));
  }
}
