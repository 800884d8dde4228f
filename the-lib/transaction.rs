//! Edits requested by the pairing engine.
//!
//! An [`Edit`] is the single command the engine hands to its host for one
//! keystroke: a list of [`Change`]s, all expressed in the coordinates of the
//! document *before* the edit, plus the [`Selection`] the host should show
//! afterwards. Hosts must apply an edit atomically: either every change lands
//! and the selection is replaced, or nothing happens.
//!
//! # Position Mapping
//!
//! [`Edit::map_position`] moves a pre-edit position through the changes. The
//! [`Assoc`] decides which side of an insertion a position sitting exactly on
//! it ends up on:
//!
//! ```ignore
//! use the_lib::{position::Position, transaction::{Assoc, Change, Edit}};
//!
//! // insert "()" at 0:4
//! let edit = Edit::new(vec![Change::insert(Position::new(0, 4), "()")], selection)?;
//! assert_eq!(edit.map_position(Position::new(0, 4), Assoc::Before), Position::new(0, 4));
//! assert_eq!(edit.map_position(Position::new(0, 4), Assoc::After), Position::new(0, 6));
//! ```

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
  Tendril,
  position::Position,
  selection::Selection,
};

pub type Result<T> = std::result::Result<T, TransactionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("invalid change range: start {from:?} is after end {to:?}")]
  InvalidRange { from: Position, to: Position },
  #[error("change range {from:?}..{to:?} overlaps previous end {prev_end:?}")]
  OverlappingChange {
    prev_end: Position,
    from:     Position,
    to:       Position,
  },
}

/// Replace `from..to` with `text`. An empty range is an insertion, empty text a
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
  pub from: Position,
  pub to:   Position,
  pub text: Tendril,
}

impl Change {
  pub fn new(from: Position, to: Position, text: impl Into<Tendril>) -> Self {
    Self {
      from,
      to,
      text: text.into(),
    }
  }

  pub fn insert(at: Position, text: impl Into<Tendril>) -> Self {
    Self::new(at, at, text)
  }

  pub fn delete(from: Position, to: Position) -> Self {
    Self::new(from, to, Tendril::new())
  }

  /// Position just past the inserted text once the change is applied.
  fn end(&self) -> Position {
    self.from.traverse(self.text.as_str())
  }

  fn map(&self, pos: Position, assoc: Assoc) -> Position {
    if pos < self.from || (pos == self.from && assoc == Assoc::Before) {
      return pos;
    }

    // inside the replaced span, or sticking to the end of an insertion
    if pos <= self.to {
      return self.end();
    }

    let end = self.end();
    if pos.line == self.to.line {
      Position::new(end.line, end.col + (pos.col - self.to.col))
    } else {
      Position::new(pos.line - self.to.line + end.line, pos.col)
    }
  }
}

/// Which side of an insertion a mapped position sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
  Before,
  After,
}

/// One atomic host edit: non-overlapping changes in pre-edit coordinates and
/// the selection to install afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
  changes:   SmallVec<[Change; 2]>,
  selection: Selection,
}

impl Edit {
  /// Sorts `changes` by start (keeping emission order for equal starts) and
  /// checks that none of them overlap.
  pub fn new(changes: impl IntoIterator<Item = Change>, selection: Selection) -> Result<Self> {
    let mut changes: SmallVec<[Change; 2]> = changes.into_iter().collect();
    changes.sort_by_key(|change| change.from);

    let mut prev_end: Option<Position> = None;
    for change in &changes {
      if change.from > change.to {
        return Err(TransactionError::InvalidRange {
          from: change.from,
          to:   change.to,
        });
      }
      if let Some(prev_end) = prev_end
        && change.from < prev_end
      {
        return Err(TransactionError::OverlappingChange {
          prev_end,
          from: change.from,
          to: change.to,
        });
      }
      prev_end = Some(change.to);
    }

    Ok(Self { changes, selection })
  }

  /// An edit that only moves the selection.
  pub fn select(selection: Selection) -> Self {
    Self {
      changes: SmallVec::new(),
      selection,
    }
  }

  pub fn changes(&self) -> &[Change] {
    &self.changes
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  pub fn into_parts(self) -> (SmallVec<[Change; 2]>, Selection) {
    (self.changes, self.selection)
  }

  /// `true` if applying the edit leaves the text untouched.
  pub fn is_selection_only(&self) -> bool {
    self.changes.is_empty()
  }

  /// Map a pre-edit position to where it lands after the edit.
  pub fn map_position(&self, pos: Position, assoc: Assoc) -> Position {
    map_through(&self.changes, pos, assoc)
  }
}

/// Changes are applied back to front so every change's own coordinates stay
/// valid while the ones after it have already shifted `pos`.
pub(crate) fn map_through(changes: &[Change], pos: Position, assoc: Assoc) -> Position {
  changes
    .iter()
    .rev()
    .fold(pos, |pos, change| change.map(pos, assoc))
}
