//! A rope-backed reference host.
//!
//! [`Document`] owns a text buffer, a selection and the indent setting, and
//! implements [`Host`] so the pairing engine can run against it. It also
//! carries the host's *default* key handling ([`Document::apply_default_key`])
//! which runs whenever the engine lets a keystroke pass through.
//!
//! # Design
//!
//! - No IO, no history, no rendering.
//! - Every [`Edit`] is validated in full before the buffer changes, then lands
//!   as one revision.
//!
//! # Example
//!
//! ```no_run
//! use the_lib::{
//!   auto_pairs::AutoPairs,
//!   document::Document,
//!   input::KeyEvent,
//!   position::Position,
//! };
//!
//! let mut doc = Document::from("foo");
//! doc.set_cursor(Position::new(0, 3)).unwrap();
//!
//! let pairs = AutoPairs::default();
//! let outcome = pairs.on_key(&mut doc, KeyEvent::char('(')).unwrap();
//! if !outcome.is_handled() {
//!   doc.apply_default_key(KeyEvent::char('(')).unwrap();
//! }
//! assert_eq!(doc.to_string(), "foo()");
//! ```

use std::{
  borrow::Cow,
  fmt,
};

use ropey::Rope;
use smallvec::SmallVec;
use the_core::{
  chars::indent_prefix,
  line_ending::{
    LineEnding,
    NATIVE_LINE_ENDING,
    auto_detect_line_ending,
    line_without_line_ending,
  },
};
use thiserror::Error;

use crate::{
  Tendril,
  host::Host,
  input::{
    Key,
    KeyEvent,
  },
  position::Position,
  selection::{
    Range,
    Selection,
    SelectionError,
  },
  transaction::{
    Assoc,
    Change,
    Edit,
    TransactionError,
  },
};

pub const DEFAULT_INDENT_WIDTH: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
  #[error("position {}:{} is outside the document", pos.line, pos.col)]
  PositionOutOfBounds { pos: Position },
  #[error(transparent)]
  Transaction(#[from] TransactionError),
  #[error(transparent)]
  Selection(#[from] SelectionError),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Clone)]
pub struct Document {
  text:         Rope,
  selection:    Selection,
  indent_width: usize,
  line_ending:  LineEnding,
  revision:     u64,
}

impl Document {
  pub fn new(text: Rope) -> Self {
    let line_ending = auto_detect_line_ending(&text).unwrap_or(NATIVE_LINE_ENDING);
    Self {
      text,
      selection: Selection::point(Position::zero()),
      indent_width: DEFAULT_INDENT_WIDTH,
      line_ending,
      revision: 0,
    }
  }

  #[must_use]
  pub fn with_indent_width(mut self, indent_width: usize) -> Self {
    self.indent_width = indent_width;
    self
  }

  #[must_use]
  pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
    self.line_ending = line_ending;
    self
  }

  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
    check_selection(&self.text, &selection)?;
    self.selection = selection;
    Ok(())
  }

  pub fn set_cursor(&mut self, pos: Position) -> Result<()> {
    self.set_selection(Selection::point(pos))
  }

  pub fn set_indent_width(&mut self, indent_width: usize) {
    self.indent_width = indent_width;
  }

  /// Number of edits applied so far. Each [`Edit`] counts once.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  pub fn len_lines(&self) -> usize {
    self.text.len_lines()
  }

  /// Char index of `pos`, which may sit anywhere up to the end of its line.
  pub fn char_idx(&self, pos: Position) -> Result<usize> {
    char_idx(&self.text, pos)
  }

  /// Apply `edit` atomically: every change and the new selection are checked
  /// before the buffer is replaced.
  pub fn apply_edit(&mut self, edit: Edit) -> Result<()> {
    let (changes, selection) = edit.into_parts();

    let spans = changes
      .iter()
      .map(|change| {
        Ok((
          char_idx(&self.text, change.from)?,
          char_idx(&self.text, change.to)?,
          change.text.as_str(),
        ))
      })
      .collect::<Result<SmallVec<[_; 2]>>>()?;

    // changes are sorted, so going back to front keeps earlier indices valid
    let mut text = self.text.clone();
    for &(from, to, insert) in spans.iter().rev() {
      text.remove(from..to);
      text.insert(from, insert);
    }
    check_selection(&text, &selection)?;

    self.text = text;
    self.selection = selection;
    self.revision += 1;
    Ok(())
  }

  /// What the editing surface does with a key nobody else handled.
  pub fn apply_default_key(&mut self, event: KeyEvent) -> Result<()> {
    // chords are commands and none are bound here
    if event.is_chord() {
      return Ok(());
    }

    let edit = match event.key {
      Key::Char(ch) => {
        let mut text = Tendril::new();
        text.push(ch);
        self.replace_ranges(|_, _| text.clone())?
      },
      Key::Enter | Key::NumpadEnter => {
        let line_ending = self.line_ending.as_str();
        self.replace_ranges(|doc, range| {
          let mut text = Tendril::from(line_ending);
          text.push_str(indent_prefix(&doc.line_text(range.from().line)));
          text
        })?
      },
      Key::Tab => {
        let text: Tendril = " ".repeat(self.indent_width.max(1)).into();
        self.replace_ranges(|_, _| text.clone())?
      },
      Key::Backspace => self.delete_ranges(|doc, pos| doc.prev_pos(pos).map(|prev| (prev, pos)))?,
      Key::Delete => self.delete_ranges(|doc, pos| doc.next_pos(pos).map(|next| (pos, next)))?,
      Key::Left => self.move_cursors(|doc, pos| doc.prev_pos(pos).unwrap_or(pos)),
      Key::Right => self.move_cursors(|doc, pos| doc.next_pos(pos).unwrap_or(pos)),
      Key::Up => self.move_cursors(|doc, pos| doc.vertical(pos, -1)),
      Key::Down => self.move_cursors(|doc, pos| doc.vertical(pos, 1)),
      Key::Escape | Key::Other => return Ok(()),
    };

    self.apply_edit(edit)
  }

  fn line_text(&self, line: usize) -> Cow<'_, str> {
    if line >= self.text.len_lines() {
      return Cow::Borrowed("");
    }
    line_without_line_ending(&self.text.slice(..), line).into()
  }

  fn line_len(&self, line: usize) -> usize {
    line_without_line_ending(&self.text.slice(..), line).len_chars()
  }

  fn prev_pos(&self, pos: Position) -> Option<Position> {
    match pos {
      Position { line: 0, col: 0 } => None,
      Position { line, col: 0 } => Some(Position::new(line - 1, self.line_len(line - 1))),
      pos => Some(pos.prev_col()),
    }
  }

  fn next_pos(&self, pos: Position) -> Option<Position> {
    if pos.col < self.line_len(pos.line) {
      Some(pos.next_col())
    } else if pos.line + 1 < self.text.len_lines() {
      Some(Position::new(pos.line + 1, 0))
    } else {
      None
    }
  }

  fn vertical(&self, pos: Position, delta: isize) -> Position {
    let Some(line) = pos.line.checked_add_signed(delta) else {
      return pos;
    };
    if line >= self.text.len_lines() {
      return pos;
    }
    Position::new(line, pos.col.min(self.line_len(line)))
  }

  /// Replace every range with `text`, leaving the cursor after it.
  fn replace_ranges(&self, mut text: impl FnMut(&Self, &Range) -> Tendril) -> Result<Edit> {
    let changes: SmallVec<[Change; 1]> = self
      .selection
      .iter()
      .map(|range| Change::new(range.from(), range.to(), text(self, range)))
      .collect();
    let edit = Edit::new(changes, self.selection.clone())?;
    let selection = self
      .selection
      .transform(|range| Range::point(edit.map_position(range.to(), Assoc::After)));
    Ok(Edit::new(edit.into_parts().0, selection)?)
  }

  /// Delete every non-empty range, or the span `span` picks around each point
  /// cursor.
  fn delete_ranges(
    &self,
    span: impl Fn(&Self, Position) -> Option<(Position, Position)>,
  ) -> Result<Edit> {
    let changes: SmallVec<[Change; 1]> = self
      .selection
      .iter()
      .filter_map(|range| {
        if range.is_empty() {
          span(self, range.cursor())
        } else {
          Some((range.from(), range.to()))
        }
      })
      .map(|(from, to)| Change::delete(from, to))
      .collect();
    let edit = Edit::new(changes, self.selection.clone())?;
    let selection = self.selection.transform(|range| {
      let start = if range.is_empty() {
        span(self, range.cursor()).map_or(range.cursor(), |(from, _)| from)
      } else {
        range.from()
      };
      Range::point(edit.map_position(start, Assoc::Before))
    });
    Ok(Edit::new(edit.into_parts().0, selection)?)
  }

  fn move_cursors(&self, step: impl Fn(&Self, Position) -> Position) -> Edit {
    Edit::select(
      self
        .selection
        .transform(|range| Range::point(step(self, range.cursor()))),
    )
  }
}

fn char_idx(text: &Rope, pos: Position) -> Result<usize> {
  if pos.line >= text.len_lines() {
    return Err(DocumentError::PositionOutOfBounds { pos });
  }

  let slice = text.slice(..);
  if pos.col > line_without_line_ending(&slice, pos.line).len_chars() {
    return Err(DocumentError::PositionOutOfBounds { pos });
  }

  Ok(text.line_to_char(pos.line) + pos.col)
}

fn check_selection(text: &Rope, selection: &Selection) -> Result<()> {
  for range in selection {
    char_idx(text, range.anchor)?;
    char_idx(text, range.head)?;
  }
  Ok(())
}

impl From<Rope> for Document {
  fn from(text: Rope) -> Self {
    Self::new(text)
  }
}

impl From<&str> for Document {
  fn from(text: &str) -> Self {
    Self::new(Rope::from(text))
  }
}

impl fmt::Display for Document {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.text, f)
  }
}

impl Host for Document {
  type Error = DocumentError;

  fn selection(&self) -> Cow<'_, Selection> {
    Cow::Borrowed(&self.selection)
  }

  fn line(&self, index: usize) -> Option<Cow<'_, str>> {
    (index < self.text.len_lines()).then(|| self.line_text(index))
  }

  fn indent_width(&self) -> usize {
    self.indent_width
  }

  fn line_ending(&self) -> LineEnding {
    self.line_ending
  }

  fn apply(&mut self, edit: Edit) -> Result<()> {
    self.apply_edit(edit)
  }
}

#[cfg(test)]
mod test {
  use smallvec::smallvec;

  use super::*;

  fn pos(line: usize, col: usize) -> Position {
    Position::new(line, col)
  }

  fn doc_at(text: &str, line: usize, col: usize) -> Document {
    let mut doc = Document::from(text).with_line_ending(LineEnding::LF);
    doc.set_cursor(pos(line, col)).unwrap();
    doc
  }

  #[test]
  fn host_lines_strip_line_endings() {
    let doc = Document::from("a(\r\n)\r\n");
    assert_eq!(doc.line_ending(), LineEnding::Crlf);
    assert_eq!(doc.line(0).as_deref(), Some("a("));
    assert_eq!(doc.line(1).as_deref(), Some(")"));
    assert_eq!(doc.line(2).as_deref(), Some(""));
    assert_eq!(doc.line(3), None);
  }

  #[test]
  fn edits_are_atomic() {
    let mut doc = doc_at("abc", 0, 0);
    let edit = Edit::new(
      vec![
        Change::insert(pos(0, 1), "x"),
        Change::insert(pos(0, 9), "y"),
      ],
      Selection::point(pos(0, 0)),
    )
    .unwrap();

    assert_eq!(
      doc.apply_edit(edit),
      Err(DocumentError::PositionOutOfBounds { pos: pos(0, 9) })
    );
    assert_eq!(doc.to_string(), "abc");
    assert_eq!(doc.revision(), 0);

    let bad_selection = Edit::new(
      vec![Change::insert(pos(0, 1), "x")],
      Selection::point(pos(0, 5)),
    )
    .unwrap();
    assert!(doc.apply_edit(bad_selection).is_err());
    assert_eq!(doc.to_string(), "abc");
  }

  #[test]
  fn multi_change_edit_lands_once() {
    let mut doc = doc_at("ab\ncd", 0, 0);
    let edit = Edit::new(
      vec![
        Change::insert(pos(1, 2), "!"),
        Change::delete(pos(0, 0), pos(0, 1)),
      ],
      Selection::point(pos(1, 3)),
    )
    .unwrap();

    doc.apply_edit(edit).unwrap();
    assert_eq!(doc.to_string(), "b\ncd!");
    assert_eq!(doc.revision(), 1);
    assert_eq!(doc.selection(), &Selection::point(pos(1, 3)));
  }

  #[test]
  fn default_insert_replaces_selection() {
    let mut doc = doc_at("hello world", 0, 0);
    doc
      .set_selection(Selection::single(Range::new(pos(0, 6), pos(0, 11))))
      .unwrap();
    doc.apply_default_key(KeyEvent::char(')')).unwrap();
    assert_eq!(doc.to_string(), "hello )");
    assert_eq!(doc.selection(), &Selection::point(pos(0, 7)));
  }

  #[test]
  fn default_line_break_carries_indent() {
    let mut doc = doc_at("  foo", 0, 5);
    doc.apply_default_key(Key::Enter.into()).unwrap();
    assert_eq!(doc.to_string(), "  foo\n  ");
    assert_eq!(doc.selection(), &Selection::point(pos(1, 2)));
  }

  #[test]
  fn default_backspace() {
    let mut doc = doc_at("a(b", 0, 2);
    doc.apply_default_key(Key::Backspace.into()).unwrap();
    assert_eq!(doc.to_string(), "ab");
    assert_eq!(doc.selection(), &Selection::point(pos(0, 1)));

    let mut doc = doc_at("ab\ncd", 1, 0);
    doc.apply_default_key(Key::Backspace.into()).unwrap();
    assert_eq!(doc.to_string(), "abcd");
    assert_eq!(doc.selection(), &Selection::point(pos(0, 2)));

    let mut doc = doc_at("ab", 0, 0);
    doc.apply_default_key(Key::Backspace.into()).unwrap();
    assert_eq!(doc.to_string(), "ab");
  }

  #[test]
  fn default_movement() {
    let mut doc = doc_at("abc\nd", 0, 3);
    doc.apply_default_key(Key::Right.into()).unwrap();
    assert_eq!(doc.selection(), &Selection::point(pos(1, 0)));
    doc.apply_default_key(Key::Left.into()).unwrap();
    assert_eq!(doc.selection(), &Selection::point(pos(0, 3)));
    doc.apply_default_key(Key::Down.into()).unwrap();
    assert_eq!(doc.selection(), &Selection::point(pos(1, 1)));
    doc.apply_default_key(Key::Up.into()).unwrap();
    assert_eq!(doc.selection(), &Selection::point(pos(0, 1)));
    doc.apply_default_key(Key::Up.into()).unwrap();
    assert_eq!(doc.selection(), &Selection::point(pos(0, 1)));
  }

  #[test]
  fn default_insert_at_every_cursor() {
    let mut doc = doc_at("ab", 0, 0);
    doc
      .set_selection(
        Selection::new(smallvec![Range::point(pos(0, 0)), Range::point(pos(0, 2))]).unwrap(),
      )
      .unwrap();
    doc.apply_default_key(KeyEvent::char('-')).unwrap();
    assert_eq!(doc.to_string(), "-ab-");
    assert_eq!(doc.selection().ranges(), &[
      Range::point(pos(0, 1)),
      Range::point(pos(0, 4)),
    ]);
  }
}
