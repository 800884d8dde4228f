use ropey::{
  Rope,
  RopeSlice,
};

#[cfg(target_os = "windows")]
pub const NATIVE_LINE_ENDING: LineEnding = LineEnding::Crlf;

#[cfg(not(target_os = "windows"))]
pub const NATIVE_LINE_ENDING: LineEnding = LineEnding::LF;

/// Line endings recognised by the document model.
///
/// Ropey is built without `unicode_lines`, so only LF and CRLF split lines.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  #[default]
  LF,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      Self::LF => 1,
    }
  }

  #[inline]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Crlf => "\u{000D}\u{000A}",
      Self::LF => "\u{000A}",
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      _ => None,
    }
  }

  #[allow(clippy::should_implement_trait)]
  #[inline]
  pub fn from_str(g: &str) -> Option<LineEnding> {
    match g {
      "\u{000D}\u{000A}" => Some(LineEnding::Crlf),
      "\u{000A}" => Some(LineEnding::LF),
      _ => None,
    }
  }
}

#[inline]
pub fn str_is_line_ending(s: &str) -> bool {
  LineEnding::from_str(s).is_some()
}

/// Attempts to detect what line ending the passed document uses.
pub fn auto_detect_line_ending(doc: &Rope) -> Option<LineEnding> {
  doc
    .lines()
    .take(100)
    .find_map(|line| get_line_ending(&line))
}

/// Returns the passed line's line ending, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  if len == 0 || line.char(len - 1) != '\n' {
    return None;
  }

  if len >= 2 && line.char(len - 2) == '\r' {
    Some(LineEnding::Crlf)
  } else {
    Some(LineEnding::LF)
  }
}

/// Returns the passed line's line ending, if any.
pub fn get_line_ending_of_str(line: &str) -> Option<LineEnding> {
  if line.ends_with("\u{000D}\u{000A}") {
    Some(LineEnding::Crlf)
  } else if line.ends_with('\u{000A}') {
    Some(LineEnding::LF)
  } else {
    None
  }
}

/// Returns the char index of the end of the given line, not including its line
/// ending.
pub fn line_end_char_index(slice: &RopeSlice, line: usize) -> usize {
  slice.line_to_char(line + 1)
    - get_line_ending(&slice.line(line))
      .map(|le| le.len_chars())
      .unwrap_or(0)
}

/// Get line `line_idx` from the passed rope slice, sans any line ending.
pub fn line_without_line_ending<'a>(slice: &RopeSlice<'a>, line_idx: usize) -> RopeSlice<'a> {
  let start = slice.line_to_char(line_idx);
  let end = line_end_char_index(slice, line_idx);
  slice.slice(start..end)
}
