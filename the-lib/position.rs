use std::cmp::Ordering;

use the_core::chars::char_is_line_ending;

/// This is a single point in a text buffer.
/// 0-indexed as all things should be, `col` counts chars within the line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
  pub line: usize,
  pub col:  usize,
}

impl PartialOrd for Position {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Position {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .line
      .cmp(&other.line)
      .then_with(|| self.col.cmp(&other.col))
  }
}

impl Position {
  pub const fn new(line: usize, col: usize) -> Self {
    Self { line, col }
  }

  pub const fn zero() -> Self {
    Self { line: 0, col: 0 }
  }

  /// Position one column to the right on the same line.
  pub const fn next_col(self) -> Self {
    Self {
      line: self.line,
      col:  self.col + 1,
    }
  }

  /// Position one column to the left, saturating at the line start.
  pub const fn prev_col(self) -> Self {
    Self {
      line: self.line,
      col:  self.col.saturating_sub(1),
    }
  }

  /// Where the cursor ends up after `text` is typed at `self`.
  pub fn traverse(self, text: impl AsRef<str>) -> Self {
    let Self { mut line, mut col } = self;
    let mut chars = text.as_ref().chars().peekable();

    while let Some(ch) = chars.next() {
      if char_is_line_ending(ch) {
        line += 1;
        col = 0;
      } else if ch == '\r' && chars.peek() == Some(&'\n') {
        // the LF that follows ends the line
      } else {
        col += 1;
      }
    }

    Self { line, col }
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}
