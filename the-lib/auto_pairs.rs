//! Automatic bracket and quote pairing.
//!
//! This module decides, for every keystroke, whether one of the pairing
//! behaviors applies and which edit realizes it. It keeps no state between
//! keystrokes: each decision is a function of the snapshot read from the
//! [`Host`] for that keystroke.
//!
//! # How It Works
//!
//! When the user types a delimiter, the engine can:
//!
//! 1. **Insert pair** - Insert both `(` and `)`, placing cursor between them
//! 2. **Wrap selection** - Surround every selected span with the pair
//! 3. **Advance** - If already at `)`, just move past it instead of inserting
//!
//! On the structural keys it can:
//!
//! 4. **Split line** - `foo(|)` + line-break opens an indented blank line
//!    between the two delimiters
//! 5. **Delete pair** - `foo(|)` + delete-backward removes both delimiters
//!
//! Anything else passes through and the host's default behavior applies.
//!
//! # Classification
//!
//! Every typed character is first classified against the [`DelimiterTable`]
//! into a [`DelimiterClass`]. The class, whether text is selected and whether
//! the next character equals the typed one feed a single decision table,
//! [`decide_char`]. Only an [`DelimiterClass::Opener`] carries a closer, so a
//! closer is never looked up for a character that was not classified as an
//! opener first.
//!
//! # Default Pairs
//!
//! ```ignore
//! pub const DEFAULT_PAIRS: &[(char, char)] = &[
//!     ('(', ')'),
//!     ('{', '}'),
//!     ('[', ']'),
//!     ('\'', '\''),
//!     ('"', '"'),
//!     ('`', '`'),
//! ];
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use the_lib::{auto_pairs::AutoPairs, input::KeyEvent};
//!
//! let pairs = AutoPairs::default();
//! if pairs.on_key(&mut host, KeyEvent::char('('))?.is_handled() {
//!     // "()" was inserted, skip the default insertion
//! }
//! ```

use std::borrow::Cow;

use smallvec::SmallVec;
use the_core::chars::{
  char_at,
  char_before,
  char_is_line_ending,
  indent_prefix,
};
use thiserror::Error;

use crate::{
  Tendril,
  host::Host,
  input::{
    Key,
    KeyEvent,
    KeyOutcome,
  },
  position::Position,
  selection::{
    Range,
    Selection,
  },
  transaction::{
    Assoc,
    Change,
    Edit,
  },
};

// Heavily based on https://github.com/codemirror/closebrackets/
pub const DEFAULT_PAIRS: &[(char, char)] = &[
  ('(', ')'),
  ('{', '}'),
  ('[', ']'),
  ('\'', '\''),
  ('"', '"'),
  ('`', '`'),
];

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
  #[error("'{open}' is listed as an opener more than once")]
  DuplicateOpener { open: char },
  #[error("closer '{close}' resolves to both '{first}' and '{second}'")]
  AmbiguousCloser {
    close:  char,
    first:  char,
    second: char,
  },
  #[error("'{ch}' opens one pair and closes another")]
  MixedRole { ch: char },
  #[error("line endings cannot be delimiters: {ch:?}")]
  LineEnding { ch: char },
  #[error("a pair is exactly two characters, got {value:?}")]
  MalformedPair { value: String },
}

/// One opener/closer pairing. Quote-style delimiters have `open == close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
  pub open:  char,
  pub close: char,
}

impl Pair {
  pub const fn new(open: char, close: char) -> Self {
    Self { open, close }
  }

  /// true if open == close
  pub const fn same(&self) -> bool {
    self.open == self.close
  }
}

impl From<(char, char)> for Pair {
  fn from((open, close): (char, char)) -> Self {
    Self::new(open, close)
  }
}

impl From<&(char, char)> for Pair {
  fn from(&(open, close): &(char, char)) -> Self {
    Self::new(open, close)
  }
}

impl TryFrom<&str> for Pair {
  type Error = TableError;

  /// Parses the two-character form used in config files, e.g. `"()"`.
  fn try_from(value: &str) -> Result<Self> {
    let mut chars = value.chars();
    match (chars.next(), chars.next(), chars.next()) {
      (Some(open), Some(close), None) => Ok(Self::new(open, close)),
      _ => Err(TableError::MalformedPair {
        value: value.to_owned(),
      }),
    }
  }
}

/// How a typed character relates to the delimiter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterClass {
  /// Not a delimiter.
  Plain,
  /// Opens an asymmetric pair.
  Opener { close: char },
  /// Closes an asymmetric pair.
  Closer { open: char },
  /// Opens and closes its own pair.
  Symmetric,
}

/// The immutable opener -> closer mapping.
///
/// Construction guarantees every glyph has exactly one role: it either opens
/// exactly one pair, closes exactly one pair, or is a symmetric delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterTable(Vec<Pair>);

impl DelimiterTable {
  pub fn new<V, A>(pairs: V) -> Result<Self>
  where
    V: IntoIterator<Item = A>,
    A: Into<Pair>,
  {
    let iter = pairs.into_iter();
    let (lower, upper) = iter.size_hint();
    let mut table: Vec<Pair> = Vec::with_capacity(upper.unwrap_or(lower));

    for pair in iter {
      let pair = pair.into();
      for ch in [pair.open, pair.close] {
        if char_is_line_ending(ch) || ch == '\r' {
          return Err(TableError::LineEnding { ch });
        }
      }

      for existing in &table {
        if existing.open == pair.open {
          return Err(TableError::DuplicateOpener { open: pair.open });
        }
        if existing.close == pair.close {
          return Err(TableError::AmbiguousCloser {
            close:  pair.close,
            first:  existing.open,
            second: pair.open,
          });
        }
        if existing.open == pair.close {
          return Err(TableError::MixedRole { ch: pair.close });
        }
        if existing.close == pair.open {
          return Err(TableError::MixedRole { ch: pair.open });
        }
      }

      table.push(pair);
    }

    Ok(Self(table))
  }

  pub fn pairs(&self) -> &[Pair] {
    &self.0
  }

  pub fn classify(&self, ch: char) -> DelimiterClass {
    for pair in &self.0 {
      if pair.open == ch {
        return if pair.same() {
          DelimiterClass::Symmetric
        } else {
          DelimiterClass::Opener { close: pair.close }
        };
      }
      if pair.close == ch {
        return DelimiterClass::Closer { open: pair.open };
      }
    }

    DelimiterClass::Plain
  }

  pub fn is_opener(&self, ch: char) -> bool {
    self.0.iter().any(|pair| pair.open == ch)
  }

  pub fn is_closer(&self, ch: char) -> bool {
    self.0.iter().any(|pair| pair.close == ch)
  }

  /// The closer paired with `open`, `None` for anything that is not an opener.
  pub fn closer_for(&self, open: char) -> Option<char> {
    match self.classify(open) {
      DelimiterClass::Opener { close } => Some(close),
      DelimiterClass::Symmetric => Some(open),
      DelimiterClass::Plain | DelimiterClass::Closer { .. } => None,
    }
  }
}

impl Default for DelimiterTable {
  fn default() -> Self {
    Self(DEFAULT_PAIRS.iter().map(Pair::from).collect())
  }
}

/// What the engine wants done for one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
  /// Not ours: let the host's default behavior run.
  PassThrough,
  /// Insert `open` + `close` and put the cursor between them.
  InsertPair { open: char, close: char },
  /// Surround the selected span with `open` and `close`.
  WrapSelection { open: char, close: char },
  /// Step over the closer under the cursor.
  Advance,
  /// Open an indented blank line between an adjacent empty pair.
  SplitLine,
  /// Remove both halves of an adjacent empty pair.
  DeletePair,
}

impl Intent {
  pub const fn is_handled(self) -> bool {
    !matches!(self, Self::PassThrough)
  }
}

/// The decision table for printable input.
///
/// `selecting` is true when the range the character is typed into selects
/// text; `next` is the character right after the cursor.
pub fn decide_char(class: DelimiterClass, ch: char, next: Option<char>, selecting: bool) -> Intent {
  let next_matches = next == Some(ch);

  match (class, selecting, next_matches) {
    (DelimiterClass::Plain, ..) => Intent::PassThrough,

    (DelimiterClass::Opener { close }, true, _) => Intent::WrapSelection { open: ch, close },
    (DelimiterClass::Symmetric, true, _) => Intent::WrapSelection {
      open:  ch,
      close: ch,
    },
    (DelimiterClass::Closer { .. }, true, _) => Intent::PassThrough,

    (DelimiterClass::Symmetric, false, true) => Intent::Advance,
    (DelimiterClass::Symmetric, false, false) => Intent::InsertPair {
      open:  ch,
      close: ch,
    },
    (DelimiterClass::Opener { close }, false, _) => Intent::InsertPair { open: ch, close },

    (DelimiterClass::Closer { .. }, false, true) => Intent::Advance,
    // closers never auto-insert a partner
    (DelimiterClass::Closer { .. }, false, false) => Intent::PassThrough,
  }
}

/// The pairing engine: a delimiter table plus the user's switches.
#[derive(Debug, Clone)]
pub struct AutoPairs {
  table:        DelimiterTable,
  enabled:      bool,
  indent_width: Option<usize>,
}

impl Default for AutoPairs {
  fn default() -> Self {
    Self::new(DelimiterTable::default())
  }
}

impl AutoPairs {
  pub fn new(table: DelimiterTable) -> Self {
    Self {
      table,
      enabled: true,
      indent_width: None,
    }
  }

  #[must_use]
  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  /// Override the host's indent width for line splitting.
  #[must_use]
  pub fn with_indent_width(mut self, indent_width: Option<usize>) -> Self {
    self.indent_width = indent_width;
    self
  }

  pub fn table(&self) -> &DelimiterTable {
    &self.table
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn indent_width(&self) -> Option<usize> {
    self.indent_width
  }

  /// Offer a keystroke to the engine.
  ///
  /// On [`KeyOutcome::Handled`] the edit has already been applied and the host
  /// must skip its default handling; on [`KeyOutcome::Continue`] nothing was
  /// touched.
  pub fn on_key<H: Host>(
    &self,
    host: &mut H,
    event: KeyEvent,
  ) -> std::result::Result<KeyOutcome, H::Error> {
    if !self.enabled || event.is_chord() {
      return Ok(KeyOutcome::Continue);
    }

    let edit = match event.key {
      Key::Char(ch) => self.char_edit(&*host, ch),
      Key::Enter | Key::NumpadEnter => self.line_break_edit(&*host),
      Key::Backspace => self.delete_edit(&*host),
      _ => None,
    };

    match edit {
      Some(edit) => {
        tracing::debug!("auto pair edit: {:#?}", edit);
        host.apply(edit)?;
        Ok(KeyOutcome::Handled)
      },
      None => Ok(KeyOutcome::Continue),
    }
  }

  /// Intent for `ch` typed into `range` on `line`.
  pub fn char_intent(&self, ch: char, line: &str, range: &Range) -> Intent {
    let class = self.table.classify(ch);
    tracing::trace!(?class, %ch, "classified keystroke");
    if class == DelimiterClass::Plain {
      return Intent::PassThrough;
    }

    let next = char_at(line, range.cursor().col);
    decide_char(class, ch, next, !range.is_empty())
  }

  /// Intent for a line-break at `range` on `line`.
  pub fn line_break_intent(&self, line: &str, range: &Range) -> Intent {
    if self.on_empty_pair(line, range) {
      Intent::SplitLine
    } else {
      Intent::PassThrough
    }
  }

  /// Intent for delete-backward at `range` on `line`.
  pub fn delete_intent(&self, line: &str, range: &Range) -> Intent {
    if self.on_empty_pair(line, range) {
      Intent::DeletePair
    } else {
      Intent::PassThrough
    }
  }

  /// `(|)`: a point cursor between an opener and its exact closer.
  fn on_empty_pair(&self, line: &str, range: &Range) -> bool {
    if !range.is_empty() {
      return false;
    }

    let col = range.cursor().col;
    match (char_before(line, col), char_at(line, col)) {
      (Some(prev), Some(next)) => self.table.closer_for(prev) == Some(next),
      _ => false,
    }
  }

  /// The edit for printable input, `None` to let the host insert `ch` itself.
  ///
  /// With several point cursors each one is decided on its own; as soon as one
  /// of them is handled the edit also inserts `ch` literally at the others.
  pub fn char_edit<H: Host + ?Sized>(&self, host: &H, ch: char) -> Option<Edit> {
    if !self.enabled || self.table.classify(ch) == DelimiterClass::Plain {
      return None;
    }

    let selection = host.selection();
    if selection.has_selected_text() {
      return self.wrap_edit(host, &selection, ch);
    }

    let intents: SmallVec<[Intent; 1]> = selection
      .iter()
      .map(|range| self.char_intent(ch, &line_at(host, range.cursor()), range))
      .collect();

    if !intents.iter().any(|intent| intent.is_handled()) {
      return None;
    }

    let changes: SmallVec<[Change; 1]> = selection
      .iter()
      .zip(&intents)
      .filter_map(|(range, intent)| {
        let cursor = range.cursor();
        match *intent {
          Intent::InsertPair { open, close } => Some(Change::insert(cursor, pair_text(open, close))),
          Intent::PassThrough => Some(Change::insert(cursor, char_text(ch))),
          _ => None,
        }
      })
      .collect();

    let mut intents = intents.into_iter();
    finish(changes, &selection, |edit, range| {
      let cursor = range.cursor();
      let head = match intents.next() {
        Some(Intent::InsertPair { .. }) => edit.map_position(cursor, Assoc::Before).next_col(),
        Some(Intent::Advance) => edit.map_position(cursor.next_col(), Assoc::Before),
        _ => edit.map_position(cursor, Assoc::After),
      };
      Range::point(head)
    })
  }

  /// Surround every non-empty range with the pair opened by `ch`. Point
  /// cursors in the same selection are handled as if typed without one.
  fn wrap_edit<H: Host + ?Sized>(&self, host: &H, selection: &Selection, ch: char) -> Option<Edit> {
    let mut intents: SmallVec<[Intent; 1]> = SmallVec::with_capacity(selection.len());
    let mut wraps: SmallVec<[(Range, char, char); 1]> = SmallVec::new();
    for range in selection.iter() {
      let line = line_at(host, range.cursor());
      let intent = self.char_intent(ch, &line, range);
      match intent {
        Intent::WrapSelection { open, close } => wraps.push((*range, open, close)),
        _ if range.is_empty() => (),
        _ => return None,
      }
      intents.push(intent);
    }

    // adjacent selections share a point: the closer of the earlier one has to
    // be emitted before the opener of the later one
    wraps.sort_by_key(|(range, ..)| range.from());
    let mut changes: SmallVec<[Change; 2]> = wraps
      .iter()
      .flat_map(|&(range, open, close)| {
        [
          Change::insert(range.from(), char_text(open)),
          Change::insert(range.to(), char_text(close)),
        ]
      })
      .collect();
    for (range, intent) in selection.iter().zip(&intents) {
      match *intent {
        Intent::InsertPair { open, close } => {
          changes.push(Change::insert(range.cursor(), pair_text(open, close)))
        },
        Intent::PassThrough => changes.push(Change::insert(range.cursor(), char_text(ch))),
        _ => (),
      }
    }

    let mut intents = intents.into_iter();
    finish(changes, selection, |edit, range| {
      match intents.next() {
        // the pair is the last insertion at its point, so stick after it and
        // step back over the closer
        Some(Intent::InsertPair { .. }) => {
          Range::point(edit.map_position(range.cursor(), Assoc::After).prev_col())
        },
        Some(Intent::Advance) => {
          Range::point(edit.map_position(range.cursor().next_col(), Assoc::Before))
        },
        Some(Intent::PassThrough) => Range::point(edit.map_position(range.cursor(), Assoc::After)),
        _ => range.with_bounds(
          edit.map_position(range.from(), Assoc::After),
          edit.map_position(range.to(), Assoc::Before),
        ),
      }
    })
  }

  /// Split `(|)` into three lines, `None` unless every cursor sits in an
  /// empty pair.
  pub fn line_break_edit<H: Host + ?Sized>(&self, host: &H) -> Option<Edit> {
    if !self.enabled {
      return None;
    }

    let selection = host.selection();
    let width = self.indent_width.unwrap_or_else(|| host.indent_width());
    let line_ending = host.line_ending().as_str();

    let mut changes: SmallVec<[Change; 1]> = SmallVec::new();
    let mut heads: SmallVec<[Tendril; 1]> = SmallVec::new();
    for range in selection.iter() {
      let line = line_at(host, range.cursor());
      if self.line_break_intent(&line, range) != Intent::SplitLine {
        return None;
      }

      let indent = indent_prefix(&line);
      let mut inner = Tendril::from(line_ending);
      inner.push_str(indent);
      for _ in 0..width {
        inner.push(' ');
      }

      let mut text = inner.clone();
      text.push_str(line_ending);
      text.push_str(indent);

      changes.push(Change::insert(range.cursor(), text));
      heads.push(inner);
    }

    let mut heads = heads.into_iter();
    finish(changes, &selection, |edit, range| {
      let start = edit.map_position(range.cursor(), Assoc::Before);
      Range::point(match heads.next() {
        Some(inner) => start.traverse(inner.as_str()),
        None => start,
      })
    })
  }

  /// Delete both halves of `(|)`, `None` unless every cursor sits in an empty
  /// pair and nothing is selected.
  pub fn delete_edit<H: Host + ?Sized>(&self, host: &H) -> Option<Edit> {
    if !self.enabled {
      return None;
    }

    let selection = host.selection();
    let mut changes: SmallVec<[Change; 1]> = SmallVec::new();
    for range in selection.iter() {
      let line = line_at(host, range.cursor());
      if self.delete_intent(&line, range) != Intent::DeletePair {
        return None;
      }

      let cursor = range.cursor();
      changes.push(Change::delete(cursor.prev_col(), cursor.next_col()));
    }

    finish(changes, &selection, |edit, range| {
      Range::point(edit.map_position(range.cursor().prev_col(), Assoc::Before))
    })
  }
}

fn line_at<'a, H: Host + ?Sized>(host: &'a H, pos: Position) -> Cow<'a, str> {
  host.line(pos.line).unwrap_or(Cow::Borrowed(""))
}

fn char_text(ch: char) -> Tendril {
  let mut text = Tendril::new();
  text.push(ch);
  text
}

fn pair_text(open: char, close: char) -> Tendril {
  let mut text = char_text(open);
  text.push(close);
  text
}

/// Validate `changes` and place every range of `selection` with `place`.
fn finish(
  changes: impl IntoIterator<Item = Change>,
  selection: &Selection,
  mut place: impl FnMut(&Edit, Range) -> Range,
) -> Option<Edit> {
  let edit = match Edit::new(changes, selection.clone()) {
    Ok(edit) => edit,
    Err(err) => {
      tracing::warn!("dropping auto pair edit: {err}");
      return None;
    },
  };

  let selection = selection.transform(|range| place(&edit, range));
  let (changes, _) = edit.into_parts();
  Edit::new(changes, selection).ok()
}

#[cfg(test)]
mod test {
  use smallvec::smallvec;

  use super::*;

  /// Records edits without applying them.
  struct FakeHost {
    lines:        Vec<String>,
    selection:    Selection,
    indent_width: usize,
    applied:      Vec<Edit>,
  }

  impl FakeHost {
    fn new(lines: &[&str], selection: Selection) -> Self {
      Self {
        lines: lines.iter().map(|line| line.to_string()).collect(),
        selection,
        indent_width: 2,
        applied: Vec::new(),
      }
    }
  }

  impl Host for FakeHost {
    type Error = std::convert::Infallible;

    fn selection(&self) -> Cow<'_, Selection> {
      Cow::Borrowed(&self.selection)
    }

    fn line(&self, index: usize) -> Option<Cow<'_, str>> {
      self.lines.get(index).map(|line| Cow::Borrowed(line.as_str()))
    }

    fn indent_width(&self) -> usize {
      self.indent_width
    }

    fn apply(&mut self, edit: Edit) -> std::result::Result<(), Self::Error> {
      self.applied.push(edit);
      Ok(())
    }
  }

  fn pos(line: usize, col: usize) -> Position {
    Position::new(line, col)
  }

  fn cursor(line: usize, col: usize) -> Selection {
    Selection::point(pos(line, col))
  }

  #[test]
  fn default_table_is_valid() {
    let table = DelimiterTable::default();
    assert_eq!(DelimiterTable::new(DEFAULT_PAIRS.iter()).unwrap(), table);
  }

  #[test]
  fn classification() {
    let table = DelimiterTable::default();
    assert_eq!(table.classify('('), DelimiterClass::Opener { close: ')' });
    assert_eq!(table.classify(']'), DelimiterClass::Closer { open: '[' });
    assert_eq!(table.classify('"'), DelimiterClass::Symmetric);
    assert_eq!(table.classify('a'), DelimiterClass::Plain);

    assert!(table.is_opener('\'') && table.is_closer('\''));
    assert!(table.is_opener('{') && !table.is_closer('{'));
    assert!(!table.is_opener('}') && table.is_closer('}'));

    assert_eq!(table.closer_for('{'), Some('}'));
    assert_eq!(table.closer_for('`'), Some('`'));
    assert_eq!(table.closer_for(')'), None);
    assert_eq!(table.closer_for('x'), None);
  }

  #[test]
  fn table_rejects_ambiguous_pairs() {
    assert_eq!(
      DelimiterTable::new([('(', ')'), ('(', ']')]),
      Err(TableError::DuplicateOpener { open: '(' })
    );
    assert_eq!(
      DelimiterTable::new([('(', ')'), ('[', ')')]),
      Err(TableError::AmbiguousCloser {
        close:  ')',
        first:  '(',
        second: '[',
      })
    );
    assert_eq!(
      DelimiterTable::new([('"', '"'), ('<', '"')]),
      Err(TableError::AmbiguousCloser {
        close:  '"',
        first:  '"',
        second: '<',
      })
    );
    // a later closer that is already an opener
    assert_eq!(
      DelimiterTable::new([('<', '>'), ('>', '<')]),
      Err(TableError::MixedRole { ch: '<' })
    );
    assert_eq!(
      DelimiterTable::new([('<', '>'), ('"', '<')]),
      Err(TableError::MixedRole { ch: '<' })
    );
    // a later opener that is already a closer
    assert_eq!(
      DelimiterTable::new([('<', '>'), ('>', '"')]),
      Err(TableError::MixedRole { ch: '>' })
    );
    assert_eq!(
      DelimiterTable::new([('\n', '|')]),
      Err(TableError::LineEnding { ch: '\n' })
    );
    assert!(DelimiterTable::new([('<', '>'), ('«', '»')]).is_ok());
  }

  #[test]
  fn pair_from_config_string() {
    assert_eq!(Pair::try_from("<>"), Ok(Pair::new('<', '>')));
    assert_eq!(Pair::try_from("**"), Ok(Pair::new('*', '*')));
    assert_eq!(
      Pair::try_from("("),
      Err(TableError::MalformedPair {
        value: "(".to_string(),
      })
    );
    assert!(Pair::try_from("(()").is_err());
  }

  #[test]
  fn decision_table() {
    use DelimiterClass::*;

    let opener = Opener { close: ')' };
    let closer = Closer { open: '(' };

    let cases = [
      // class, typed, next, selecting, expected
      (Plain, 'a', Some('a'), false, Intent::PassThrough),
      (Plain, 'a', None, true, Intent::PassThrough),
      (opener, '(', None, false, Intent::InsertPair {
        open:  '(',
        close: ')',
      }),
      (opener, '(', Some('('), false, Intent::InsertPair {
        open:  '(',
        close: ')',
      }),
      (opener, '(', Some('x'), true, Intent::WrapSelection {
        open:  '(',
        close: ')',
      }),
      (closer, ')', Some(')'), false, Intent::Advance),
      (closer, ')', Some('x'), false, Intent::PassThrough),
      (closer, ')', None, false, Intent::PassThrough),
      (closer, ')', Some(')'), true, Intent::PassThrough),
      (Symmetric, '"', Some('"'), false, Intent::Advance),
      (Symmetric, '"', Some('x'), false, Intent::InsertPair {
        open:  '"',
        close: '"',
      }),
      (Symmetric, '"', Some('"'), true, Intent::WrapSelection {
        open:  '"',
        close: '"',
      }),
    ];

    for (class, ch, next, selecting, expected) in cases {
      assert_eq!(
        decide_char(class, ch, next, selecting),
        expected,
        "{class:?} {ch:?} next={next:?} selecting={selecting}"
      );
    }
  }

  #[test]
  fn intents_read_the_cursor_neighbourhood() {
    let pairs = AutoPairs::default();
    let at = |col| Range::point(pos(0, col));

    assert_eq!(pairs.char_intent(')', "a()", &at(2)), Intent::Advance);
    assert_eq!(pairs.char_intent(')', "a()", &at(3)), Intent::PassThrough);
    assert_eq!(pairs.line_break_intent("  foo()", &at(6)), Intent::SplitLine);
    assert_eq!(pairs.line_break_intent("  foo()", &at(7)), Intent::PassThrough);
    assert_eq!(pairs.line_break_intent("(]", &at(1)), Intent::PassThrough);
    assert_eq!(pairs.delete_intent("a''b", &at(2)), Intent::DeletePair);
    assert_eq!(pairs.delete_intent(")(", &at(1)), Intent::PassThrough);
    assert_eq!(pairs.delete_intent("()", &at(0)), Intent::PassThrough);
    assert_eq!(
      pairs.delete_intent("()", &Range::new(pos(0, 0), pos(0, 1))),
      Intent::PassThrough
    );
  }

  #[test]
  fn insert_pair_places_cursor_between() {
    let pairs = AutoPairs::default();
    let mut host = FakeHost::new(&["foo"], cursor(0, 3));

    let outcome = pairs.on_key(&mut host, KeyEvent::char('(')).unwrap();
    assert_eq!(outcome, KeyOutcome::Handled);

    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[Change::insert(pos(0, 3), "()")]);
    assert_eq!(edit.selection(), &cursor(0, 4));
  }

  #[test]
  fn plain_chars_are_never_touched() {
    let pairs = AutoPairs::default();
    let mut host = FakeHost::new(&["foo()"], cursor(0, 4));

    for ch in ['a', ' ', '<', '>', '\t', 'é'] {
      assert_eq!(
        pairs.on_key(&mut host, KeyEvent::char(ch)).unwrap(),
        KeyOutcome::Continue
      );
    }
    assert!(host.applied.is_empty());
  }

  #[test]
  fn closer_advances_only_over_itself() {
    let pairs = AutoPairs::default();

    let mut host = FakeHost::new(&["f(x)"], cursor(0, 3));
    assert!(pairs.on_key(&mut host, KeyEvent::char(')')).unwrap().is_handled());
    let edit = &host.applied[0];
    assert!(edit.is_selection_only());
    assert_eq!(edit.selection(), &cursor(0, 4));

    let mut host = FakeHost::new(&["f(x]"], cursor(0, 3));
    assert_eq!(
      pairs.on_key(&mut host, KeyEvent::char(')')).unwrap(),
      KeyOutcome::Continue
    );
    assert!(host.applied.is_empty());
  }

  #[test]
  fn wraps_each_selection_independently() {
    let pairs = AutoPairs::default();
    let selection = Selection::new(smallvec![
      Range::new(pos(0, 4), pos(0, 7)),
      Range::new(pos(0, 2), pos(0, 0)),
    ])
    .unwrap();
    let mut host = FakeHost::new(&["ab  cde"], selection);

    assert!(pairs.on_key(&mut host, KeyEvent::char('[')).unwrap().is_handled());
    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[
      Change::insert(pos(0, 0), "["),
      Change::insert(pos(0, 2), "]"),
      Change::insert(pos(0, 4), "["),
      Change::insert(pos(0, 7), "]"),
    ]);
    // "[ab]  [cde]"
    assert_eq!(edit.selection().ranges(), &[
      Range::new(pos(0, 7), pos(0, 10)),
      Range::new(pos(0, 3), pos(0, 1)),
    ]);
  }

  #[test]
  fn wrap_with_extra_point_cursor_inserts_pair() {
    let pairs = AutoPairs::default();
    let selection = Selection::new(smallvec![
      Range::new(pos(0, 0), pos(0, 2)),
      Range::point(pos(0, 5)),
    ])
    .unwrap();
    let mut host = FakeHost::new(&["ab cd"], selection);

    assert!(pairs.on_key(&mut host, KeyEvent::char('(')).unwrap().is_handled());
    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[
      Change::insert(pos(0, 0), "("),
      Change::insert(pos(0, 2), ")"),
      Change::insert(pos(0, 5), "()"),
    ]);
    // "(ab) cd(|)"
    assert_eq!(edit.selection().ranges(), &[
      Range::new(pos(0, 1), pos(0, 3)),
      Range::point(pos(0, 8)),
    ]);
  }

  #[test]
  fn closer_over_selection_passes_through() {
    let pairs = AutoPairs::default();
    let selection = Selection::single(Range::new(pos(0, 0), pos(0, 2)));
    let mut host = FakeHost::new(&["ab)"], selection);

    assert_eq!(
      pairs.on_key(&mut host, KeyEvent::char(')')).unwrap(),
      KeyOutcome::Continue
    );
  }

  #[test]
  fn mixed_cursors_insert_literal_where_unhandled() {
    let pairs = AutoPairs::default();
    let selection = Selection::new(smallvec![
      Range::point(pos(0, 1)),
      Range::point(pos(0, 3)),
    ])
    .unwrap();
    // "a)b|x" -> first cursor sits before ')', second before 'x'
    let mut host = FakeHost::new(&["a)bx"], selection);

    assert!(pairs.on_key(&mut host, KeyEvent::char(')')).unwrap().is_handled());
    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[Change::insert(pos(0, 3), ")")]);
    assert_eq!(edit.selection().ranges(), &[
      Range::point(pos(0, 2)),
      Range::point(pos(0, 4)),
    ]);
  }

  #[test]
  fn line_break_splits_empty_pair() {
    let pairs = AutoPairs::default();
    let mut host = FakeHost::new(&["  foo()"], cursor(0, 6));

    assert!(pairs.on_key(&mut host, Key::Enter.into()).unwrap().is_handled());
    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[Change::insert(pos(0, 6), "\n    \n  ")]);
    assert_eq!(edit.selection(), &cursor(1, 4));
  }

  #[test]
  fn line_break_honours_width_override() {
    let pairs = AutoPairs::default().with_indent_width(Some(0));
    let mut host = FakeHost::new(&["\t{}"], cursor(0, 2));

    assert!(pairs.on_key(&mut host, Key::Enter.into()).unwrap().is_handled());
    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[Change::insert(pos(0, 2), "\n\t\n\t")]);
    assert_eq!(edit.selection(), &cursor(1, 1));
  }

  #[test]
  fn delete_removes_both_halves() {
    let pairs = AutoPairs::default();
    let mut host = FakeHost::new(&["a(b", "x[]y"], cursor(1, 2));

    assert!(pairs.on_key(&mut host, Key::Backspace.into()).unwrap().is_handled());
    let edit = &host.applied[0];
    assert_eq!(edit.changes(), &[Change::delete(pos(1, 1), pos(1, 3))]);
    assert_eq!(edit.selection(), &cursor(1, 1));
  }

  #[test]
  fn structural_keys_need_every_cursor_on_a_pair() {
    let pairs = AutoPairs::default();
    let selection = Selection::new(smallvec![
      Range::point(pos(0, 1)),
      Range::point(pos(1, 1)),
    ])
    .unwrap();
    let mut host = FakeHost::new(&["()", "(x"], selection);

    assert_eq!(
      pairs.on_key(&mut host, Key::Backspace.into()).unwrap(),
      KeyOutcome::Continue
    );
    assert_eq!(
      pairs.on_key(&mut host, Key::Enter.into()).unwrap(),
      KeyOutcome::Continue
    );
    assert!(host.applied.is_empty());
  }

  #[test]
  fn disabled_or_chorded_keys_pass_through() {
    let mut host = FakeHost::new(&[""], cursor(0, 0));

    let disabled = AutoPairs::default().with_enabled(false);
    assert_eq!(
      disabled.on_key(&mut host, KeyEvent::char('(')).unwrap(),
      KeyOutcome::Continue
    );

    let mut ctrl = crate::input::Modifiers::empty();
    ctrl.insert(crate::input::Modifiers::CTRL);
    let chord = KeyEvent::char('(').with_modifiers(ctrl);
    assert_eq!(
      AutoPairs::default().on_key(&mut host, chord).unwrap(),
      KeyOutcome::Continue
    );
    assert!(host.applied.is_empty());
  }
}
