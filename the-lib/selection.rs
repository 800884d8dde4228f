//! Cursor positions and multi-cursor selections.
//!
//! A [`Range`] has two positions: `anchor` and `head`. The `head` is where the
//! cursor visually appears, while the `anchor` is the other end of the
//! selection. When `anchor == head`, the range is a point (no selection).
//!
//! ```text
//! anchor=(0,2), head=(0,7): "he[llo w]orld"  (forward selection)
//! anchor=(0,7), head=(0,2): "he]llo w[orld"  (backward selection)
//! anchor=(0,5), head=(0,5): "hello|world"    (point/cursor)
//! ```
//!
//! A [`Selection`] contains one or more [`Range`]s and remembers which one is
//! primary. Unlike a full editor selection it does not merge overlapping
//! ranges: the host owns normalization and hands the engine whatever it
//! currently shows.

use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

use crate::{
  movement::Direction,
  position::Position,
};

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one range")]
  EmptySelection,
  #[error("primary index {index} out of bounds for selection of length {len}")]
  PrimaryIndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
  pub anchor: Position,
  pub head:   Position,
}

impl Range {
  pub fn new(anchor: Position, head: Position) -> Self {
    Self { anchor, head }
  }

  pub fn point(pos: Position) -> Self {
    Self::new(pos, pos)
  }

  /// Start of the range.
  #[inline]
  #[must_use]
  pub fn from(&self) -> Position {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range.
  #[inline]
  #[must_use]
  pub fn to(&self) -> Position {
    std::cmp::max(self.anchor, self.head)
  }

  /// `true` when nothing is selected.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  /// Where the cursor is drawn and where typed text lands.
  #[inline]
  pub fn cursor(&self) -> Position {
    self.head
  }

  #[inline]
  pub fn direction(&self) -> Direction {
    if self.head < self.anchor {
      Direction::Backward
    } else {
      Direction::Forward
    }
  }

  /// Rebuild the range from new bounds, keeping its direction.
  #[must_use]
  pub fn with_bounds(self, from: Position, to: Position) -> Self {
    match self.direction() {
      Direction::Forward => Self::new(from, to),
      Direction::Backward => Self::new(to, from),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  ranges:        SmallVec<[Range; 1]>,
  primary_index: usize,
}

impl Selection {
  /// Build a selection whose first range is primary.
  pub fn new(ranges: SmallVec<[Range; 1]>) -> Result<Self> {
    Self::with_primary(ranges, 0)
  }

  pub fn with_primary(ranges: SmallVec<[Range; 1]>, primary_index: usize) -> Result<Self> {
    if ranges.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    if primary_index >= ranges.len() {
      return Err(SelectionError::PrimaryIndexOutOfBounds {
        index: primary_index,
        len:   ranges.len(),
      });
    }

    Ok(Self {
      ranges,
      primary_index,
    })
  }

  /// A single cursor.
  pub fn point(pos: Position) -> Self {
    Self::single(Range::point(pos))
  }

  pub fn single(range: Range) -> Self {
    Self {
      ranges:        smallvec![range],
      primary_index: 0,
    }
  }

  pub fn ranges(&self) -> &[Range] {
    &self.ranges
  }

  pub fn primary(&self) -> Range {
    self.ranges[self.primary_index]
  }

  pub fn primary_index(&self) -> usize {
    self.primary_index
  }

  pub fn len(&self) -> usize {
    self.ranges.len()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Range> {
    self.ranges.iter()
  }

  /// `true` if at least one range selects text.
  pub fn has_selected_text(&self) -> bool {
    self.ranges.iter().any(|range| !range.is_empty())
  }

  /// Map every range, keeping the primary index.
  #[must_use]
  pub fn transform(&self, mut f: impl FnMut(Range) -> Range) -> Self {
    Self {
      ranges:        self.ranges.iter().map(|range| f(*range)).collect(),
      primary_index: self.primary_index,
    }
  }
}

impl<'a> IntoIterator for &'a Selection {
  type Item = &'a Range;
  type IntoIter = std::slice::Iter<'a, Range>;

  fn into_iter(self) -> Self::IntoIter {
    self.ranges.iter()
  }
}
