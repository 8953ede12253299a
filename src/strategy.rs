use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::free_list::FreeList;

/// Placement strategy used to pick a free extent for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
  /// Smallest extent that fits; the lowest address wins ties.
  #[default]
  BestFit,
  /// Largest extent that fits; the lowest address wins ties.
  WorstFit,
  /// First extent that fits, scanning from the roving cursor with one wrap.
  NextFit,
  /// First extent that fits, scanning from the lowest address.
  FirstFit,
}

impl SearchMode {
  pub const ALL: [SearchMode; 4] = [
    SearchMode::BestFit,
    SearchMode::WorstFit,
    SearchMode::NextFit,
    SearchMode::FirstFit,
  ];

  pub fn name(self) -> &'static str {
    match self {
      SearchMode::BestFit => "best-fit",
      SearchMode::WorstFit => "worst-fit",
      SearchMode::NextFit => "next-fit",
      SearchMode::FirstFit => "first-fit",
    }
  }

  /// Slot of the extent this strategy picks for `size`, or `None` when no
  /// extent is large enough. `from` is only consulted by next-fit.
  pub(crate) fn select(
    self,
    list: &FreeList,
    size: usize,
    from: usize,
  ) -> Option<usize> {
    match self {
      SearchMode::BestFit => pick(list, size, |candidate, chosen| candidate < chosen),
      SearchMode::WorstFit => pick(list, size, |candidate, chosen| candidate > chosen),
      SearchMode::NextFit => next_fit(list, size, from),
      SearchMode::FirstFit => list.iter().position(|extent| extent.size >= size),
    }
  }
}

/// Full scan keeping the first fitting extent that `better` strictly prefers,
/// so an equal-sized later extent never displaces an earlier one.
fn pick(
  list: &FreeList,
  size: usize,
  better: impl Fn(usize, usize) -> bool,
) -> Option<usize> {
  let mut chosen: Option<(usize, usize)> = None;

  for (index, extent) in list.iter().enumerate() {
    if extent.size < size {
      continue;
    }

    match chosen {
      Some((_, chosen_size)) if !better(extent.size, chosen_size) => {}
      _ => chosen = Some((index, extent.size)),
    }
  }

  chosen.map(|(index, _)| index)
}

/// Examines every extent exactly once, starting at `from` and wrapping.
fn next_fit(
  list: &FreeList,
  size: usize,
  from: usize,
) -> Option<usize> {
  let len = list.len();
  let from = if from < len { from } else { 0 };

  (0..len)
    .map(|step| (from + step) % len)
    .find(|&index| list.get(index).is_some_and(|extent| extent.size >= size))
}

impl fmt::Display for SearchMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown search mode `{0}`, expected best-fit, worst-fit, next-fit or first-fit")]
pub struct ParseSearchModeError(String);

impl FromStr for SearchMode {
  type Err = ParseSearchModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
      "best-fit" | "best" => Ok(SearchMode::BestFit),
      "worst-fit" | "worst" => Ok(SearchMode::WorstFit),
      "next-fit" | "next" => Ok(SearchMode::NextFit),
      "first-fit" | "first" => Ok(SearchMode::FirstFit),
      _ => Err(ParseSearchModeError(s.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Extent;

  /// Free extents of the given sizes separated by one-unit gaps.
  fn holes(sizes: &[usize]) -> FreeList {
    let capacity = sizes.iter().map(|size| size + 1).sum();
    let mut list = FreeList::new(capacity);
    list.take(0, capacity);

    let mut start = 0;
    for &size in sizes {
      list.release(Extent::new(start, size));
      start += size + 1;
    }
    list
  }

  #[test]
  fn test_best_and_worst_fit_selection() {
    let list = holes(&[7, 3, 12]);

    assert_eq!(SearchMode::BestFit.select(&list, 5, 0), Some(0));
    assert_eq!(SearchMode::WorstFit.select(&list, 5, 0), Some(2));
    assert_eq!(SearchMode::FirstFit.select(&list, 5, 0), Some(0));
    assert_eq!(SearchMode::BestFit.select(&list, 13, 0), None);
  }

  #[test]
  fn test_ties_go_to_lowest_address() {
    let list = holes(&[4, 9, 4, 9]);

    assert_eq!(SearchMode::BestFit.select(&list, 3, 0), Some(0));
    assert_eq!(SearchMode::WorstFit.select(&list, 3, 0), Some(1));
  }

  #[test]
  fn test_next_fit_starts_at_cursor_and_wraps() {
    let list = holes(&[8, 2, 2, 2]);

    assert_eq!(SearchMode::NextFit.select(&list, 2, 2), Some(2));
    assert_eq!(SearchMode::NextFit.select(&list, 5, 1), Some(0));
    assert_eq!(SearchMode::NextFit.select(&list, 9, 3), None);
    assert_eq!(SearchMode::NextFit.select(&list, 2, 99), Some(0));
  }

  #[test]
  fn test_empty_list_never_fits() {
    let list = FreeList::new(0);

    for mode in SearchMode::ALL {
      assert_eq!(mode.select(&list, 1, 0), None);
    }
  }

  #[test]
  fn test_parse_and_display() {
    for mode in SearchMode::ALL {
      assert_eq!(mode.to_string().parse::<SearchMode>(), Ok(mode));
    }

    assert_eq!("Worst_Fit".parse::<SearchMode>(), Ok(SearchMode::WorstFit));
    assert_eq!(" next ".parse::<SearchMode>(), Ok(SearchMode::NextFit));
    assert!("buddy".parse::<SearchMode>().is_err());
  }
}
