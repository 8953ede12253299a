use log::trace;

use crate::free_list::{ExtentId, FreeList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
  slot: usize,
  id: ExtentId,
}

/// Next-fit roving pointer.
///
/// Holds the slot of the free extent where the next search begins together
/// with that extent's id, so a slot whose occupant changed is detected rather
/// than followed. With no anchor the search begins at the head of the list.
#[derive(Debug, Clone, Default)]
pub(crate) struct RovingCursor {
  anchor: Option<Anchor>,
}

impl RovingCursor {
  pub(crate) fn reset(&mut self) {
    self.anchor = None;
  }

  /// The slot where the next search begins.
  ///
  /// Falls back to the extent's new slot if it moved, and to the head of the
  /// list if it no longer exists.
  pub(crate) fn resolve(
    &self,
    list: &FreeList,
  ) -> usize {
    let Some(anchor) = self.anchor else {
      return 0;
    };

    if list.id_at(anchor.slot) == Some(anchor.id) {
      return anchor.slot;
    }

    list.position_of(anchor.id).unwrap_or(0)
  }

  /// Anchors the cursor to the extent now occupying `slot`, wrapping to the
  /// head when `slot` is past the end of the list.
  pub(crate) fn point_at(
    &mut self,
    list: &FreeList,
    slot: usize,
  ) {
    let slot = if slot < list.len() { slot } else { 0 };

    self.anchor = list.id_at(slot).map(|id| Anchor { slot, id });
    trace!("RovingCursor::point_at: {:?}", self.anchor.map(|anchor| anchor.slot));
  }

  /// Re-anchors after the list changed shape under a free.
  ///
  /// A surviving extent is followed to its new slot; a merged-away extent
  /// snaps the cursor to the first extent, or to nothing on an empty list.
  pub(crate) fn revalidate(
    &mut self,
    list: &FreeList,
  ) {
    let slot = self
      .anchor
      .and_then(|anchor| list.position_of(anchor.id))
      .unwrap_or(0);

    self.point_at(list, slot);
  }

  /// The anchored slot, if any, without validation.
  #[cfg(test)]
  fn slot(&self) -> Option<usize> {
    self.anchor.map(|anchor| anchor.slot)
  }
}
