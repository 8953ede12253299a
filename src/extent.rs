use std::fmt;

/// A half-open range `[start, start + size)` of the simulated address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
  pub start: usize,
  pub size: usize,
}

impl Extent {
  pub fn new(
    start: usize,
    size: usize,
  ) -> Self {
    Self { start, size }
  }

  /// One past the last address covered by this extent.
  pub fn end(&self) -> usize {
    self.start + self.size
  }

  /// True when `next` begins exactly where `self` ends.
  pub fn touches(
    &self,
    next: &Extent,
  ) -> bool {
    self.end() == next.start
  }

  pub fn overlaps(
    &self,
    other: &Extent,
  ) -> bool {
    self.start < other.end() && other.start < self.end()
  }

  /// Splits `size` units off the low end, returning the carved piece and the
  /// remainder (`None` on an exact fit).
  pub fn carve(
    &self,
    size: usize,
  ) -> (Extent, Option<Extent>) {
    debug_assert!(size > 0 && size <= self.size);

    let carved = Extent::new(self.start, size);
    let rest = (size < self.size).then(|| Extent::new(self.start + size, self.size - size));

    (carved, rest)
  }
}

/// Renders `[start-last](size)` with inclusive bounds.
impl fmt::Display for Extent {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "[{:3}-{:3}]({:3})", self.start, self.end() - 1, self.size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_carve_split_and_exact() {
    let extent = Extent::new(10, 8);

    let (carved, rest) = extent.carve(3);
    assert_eq!(carved, Extent::new(10, 3));
    assert_eq!(rest, Some(Extent::new(13, 5)));

    let (carved, rest) = extent.carve(8);
    assert_eq!(carved, extent);
    assert_eq!(rest, None);
  }

  #[test]
  fn test_touches_and_overlaps() {
    let a = Extent::new(0, 10);
    let b = Extent::new(10, 5);
    let c = Extent::new(9, 2);

    assert!(a.touches(&b));
    assert!(!b.touches(&a));
    assert!(!a.overlaps(&b));
    assert!(a.overlaps(&c));
    assert!(b.overlaps(&c));
  }

  #[test]
  fn test_display() {
    assert_eq!(Extent::new(0, 10).to_string(), "[  0-  9]( 10)");
    assert_eq!(Extent::new(100, 1).to_string(), "[100-100](  1)");
  }
}
