//! The editing surface the engine runs against.
//!
//! The engine never reaches into editor globals. Everything it reads comes
//! through [`Host`] as a fresh snapshot per keystroke, and everything it
//! changes goes back as a single [`Edit`]. Suppressing the host's default
//! handling is signalled by returning [`KeyOutcome::Handled`] from
//! [`AutoPairs::on_key`].
//!
//! [`KeyOutcome::Handled`]: crate::input::KeyOutcome::Handled
//! [`AutoPairs::on_key`]: crate::auto_pairs::AutoPairs::on_key

use std::borrow::Cow;

use the_core::line_ending::LineEnding;

use crate::{
  selection::Selection,
  transaction::Edit,
};

pub trait Host {
  type Error;

  /// Current cursors and selections. Always at least one range.
  fn selection(&self) -> Cow<'_, Selection>;

  /// Text of line `index` without its line ending, `None` past the end.
  fn line(&self, index: usize) -> Option<Cow<'_, str>>;

  /// Columns per indent level.
  fn indent_width(&self) -> usize;

  /// Line ending used when the engine splits a line.
  fn line_ending(&self) -> LineEnding {
    LineEnding::LF
  }

  /// Apply `edit` atomically, then install its selection.
  fn apply(&mut self, edit: Edit) -> Result<(), Self::Error>;
}

impl<H: Host + ?Sized> Host for &mut H {
  type Error = H::Error;

  fn selection(&self) -> Cow<'_, Selection> {
    (**self).selection()
  }

  fn line(&self, index: usize) -> Option<Cow<'_, str>> {
    (**self).line(index)
  }

  fn indent_width(&self) -> usize {
    (**self).indent_width()
  }

  fn line_ending(&self) -> LineEnding {
    (**self).line_ending()
  }

  fn apply(&mut self, edit: Edit) -> Result<(), Self::Error> {
    (**self).apply(edit)
  }
}
