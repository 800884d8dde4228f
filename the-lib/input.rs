//! Keystrokes as the host delivers them to the engine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
  bits: u8,
}

impl Modifiers {
  pub const CTRL: u8 = 0b0000_0001;
  pub const ALT: u8 = 0b0000_0010;
  pub const SHIFT: u8 = 0b0000_0100;

  #[must_use]
  pub const fn empty() -> Self {
    Self { bits: 0 }
  }

  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.bits == 0
  }

  #[must_use]
  pub const fn ctrl(self) -> bool {
    (self.bits & Self::CTRL) != 0
  }

  #[must_use]
  pub const fn alt(self) -> bool {
    (self.bits & Self::ALT) != 0
  }

  #[must_use]
  pub const fn shift(self) -> bool {
    (self.bits & Self::SHIFT) != 0
  }

  pub fn insert(&mut self, bits: u8) {
    self.bits |= bits;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
  /// Printable character input.
  Char(char),
  /// The structural "line-break" key.
  Enter,
  NumpadEnter,
  /// The structural "delete-backward" key.
  Backspace,
  Delete,
  Tab,
  Escape,
  Left,
  Right,
  Up,
  Down,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
  pub key:       Key,
  pub modifiers: Modifiers,
}

impl KeyEvent {
  pub const fn new(key: Key) -> Self {
    Self {
      key,
      modifiers: Modifiers::empty(),
    }
  }

  pub const fn char(ch: char) -> Self {
    Self::new(Key::Char(ch))
  }

  #[must_use]
  pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
    self.modifiers = modifiers;
    self
  }

  /// Ctrl/Alt chords are commands, never text.
  pub const fn is_chord(&self) -> bool {
    self.modifiers.ctrl() || self.modifiers.alt()
  }
}

impl From<Key> for KeyEvent {
  fn from(key: Key) -> Self {
    Self::new(key)
  }
}

/// What the host should do with the keystroke after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOutcome {
  /// Not handled: the host runs its default behavior.
  #[default]
  Continue,
  /// Handled: the engine already applied its edit, suppress the default.
  Handled,
}

impl KeyOutcome {
  pub const fn is_handled(self) -> bool {
    matches!(self, Self::Handled)
  }
}
