use crate::line_ending::LineEnding;

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

/// The leading run of spaces and tabs on `line`.
///
/// The prefix is returned verbatim, so copying it onto a new line reproduces
/// the exact indentation of the original. Other Unicode whitespace is content.
pub fn indent_prefix(line: &str) -> &str {
  let end = line
    .char_indices()
    .find(|&(_, ch)| !matches!(ch, ' ' | '\t'))
    .map(|(idx, _)| idx)
    .unwrap_or(line.len());
  &line[..end]
}

/// The char at column `col` of `line`, if any.
#[inline]
pub fn char_at(line: &str, col: usize) -> Option<char> {
  line.chars().nth(col)
}

/// The char immediately left of column `col`, if any.
#[inline]
pub fn char_before(line: &str, col: usize) -> Option<char> {
  col.checked_sub(1).and_then(|col| char_at(line, col))
}
