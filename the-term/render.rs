//! Plain-text output of the final document.

use std::fmt::Write;

use eyre::Result;
use the_lib::document::Document;

const CURSOR: char = '|';
const SELECTION_START: char = '[';
const SELECTION_END: char = ']';

/// The document text, with cursor markers when `show_cursors` is set.
///
/// Point cursors render as `|`, selections as `[` ... `]` around the selected
/// text.
pub fn render(doc: &Document, show_cursors: bool) -> Result<String> {
  if !show_cursors {
    return Ok(doc.to_string());
  }

  // (char index, order at that index, marker)
  let mut markers: Vec<(usize, u8, char)> = Vec::with_capacity(doc.selection().len() * 2);
  for range in doc.selection() {
    if range.is_empty() {
      markers.push((doc.char_idx(range.head)?, 1, CURSOR));
    } else {
      markers.push((doc.char_idx(range.from())?, 2, SELECTION_START));
      markers.push((doc.char_idx(range.to())?, 0, SELECTION_END));
    }
  }
  markers.sort_unstable();

  let mut out = String::with_capacity(doc.text().len_bytes() + markers.len());
  let mut markers = markers.into_iter().peekable();
  for (idx, ch) in doc.text().chars().enumerate() {
    while let Some((_, _, marker)) = markers.next_if(|&(at, ..)| at <= idx) {
      out.push(marker);
    }
    out.push(ch);
  }
  for (_, _, marker) in markers {
    out.push(marker);
  }

  Ok(out)
}

/// One line per range, `line:col` 1-based, primary first.
pub fn describe_selection(doc: &Document) -> String {
  let selection = doc.selection();
  let mut out = String::new();
  let ranges = std::iter::once(selection.primary()).chain(
    selection
      .iter()
      .enumerate()
      .filter(|&(idx, _)| idx != selection.primary_index())
      .map(|(_, range)| *range),
  );
  for range in ranges {
    let (anchor, head) = (range.anchor, range.head);
    let _ = writeln!(
      out,
      "{}:{}-{}:{}",
      anchor.line + 1,
      anchor.col + 1,
      head.line + 1,
      head.col + 1
    );
  }
  out
}
