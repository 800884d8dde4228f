//! Key scripts and cursor arguments.
//!
//! A key script is typed text with named keys in angle brackets:
//! `foo(<ret>bar<bs>`. `<lt>` types a literal `<`, and `C-`/`A-` prefixes
//! inside the brackets add modifiers (`<C-(>`).

use the_lib::{
  input::{
    Key,
    KeyEvent,
    Modifiers,
  },
  position::Position,
  selection::Range,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
  #[error("unknown key <{0}>")]
  UnknownKey(String),
  #[error("unterminated key name starting at offset {0}")]
  Unterminated(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {expected}, got {value:?}")]
pub struct ArgError {
  expected: &'static str,
  value:    String,
}

pub fn parse_keys(script: &str) -> Result<Vec<KeyEvent>, ScriptError> {
  let mut events = Vec::new();
  let mut rest = script;

  while let Some(ch) = rest.chars().next() {
    if ch != '<' {
      events.push(KeyEvent::char(ch));
      rest = &rest[ch.len_utf8()..];
      continue;
    }

    let offset = script.len() - rest.len();
    let Some(end) = rest.find('>') else {
      return Err(ScriptError::Unterminated(offset));
    };
    // `<>>` names the `>` key
    let end = if end == 1 && rest[2..].starts_with('>') { 2 } else { end };
    events.push(parse_named(&rest[1..end])?);
    rest = &rest[end + 1..];
  }

  Ok(events)
}

fn parse_named(name: &str) -> Result<KeyEvent, ScriptError> {
  let mut modifiers = Modifiers::empty();
  let mut key = name;
  loop {
    if let Some(rest) = key.strip_prefix("C-")
      && !rest.is_empty()
    {
      modifiers.insert(Modifiers::CTRL);
      key = rest;
    } else if let Some(rest) = key.strip_prefix("A-")
      && !rest.is_empty()
    {
      modifiers.insert(Modifiers::ALT);
      key = rest;
    } else {
      break;
    }
  }

  let key = match key {
    "ret" | "enter" => Key::Enter,
    "bs" | "backspace" => Key::Backspace,
    "del" => Key::Delete,
    "tab" => Key::Tab,
    "esc" => Key::Escape,
    "left" => Key::Left,
    "right" => Key::Right,
    "up" => Key::Up,
    "down" => Key::Down,
    "lt" => Key::Char('<'),
    "gt" => Key::Char('>'),
    "space" => Key::Char(' '),
    single => {
      let mut chars = single.chars();
      match (chars.next(), chars.next()) {
        (Some(ch), None) => Key::Char(ch),
        _ => return Err(ScriptError::UnknownKey(name.to_string())),
      }
    },
  };

  Ok(KeyEvent::new(key).with_modifiers(modifiers))
}

/// `LINE:COL`, both 1-based.
pub fn parse_position(value: &str) -> Result<Position, ArgError> {
  let err = || ArgError {
    expected: "LINE:COL",
    value:    value.to_string(),
  };

  let (line, col) = value.split_once(':').ok_or_else(err)?;
  let line: usize = line.trim().parse().map_err(|_| err())?;
  let col: usize = col.trim().parse().map_err(|_| err())?;
  Ok(Position::new(line.saturating_sub(1), col.saturating_sub(1)))
}

/// `LINE:COL-LINE:COL`, anchor first.
pub fn parse_range(value: &str) -> Result<Range, ArgError> {
  let (anchor, head) = value.split_once('-').ok_or_else(|| ArgError {
    expected: "LINE:COL-LINE:COL",
    value:    value.to_string(),
  })?;
  Ok(Range::new(parse_position(anchor)?, parse_position(head)?))
}
