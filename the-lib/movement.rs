//! Movement direction for cursor and selection operations.
//!
//! ```ignore
//! use the_lib::{movement::Direction, position::Position, selection::Range};
//!
//! let range = Range::new(Position::new(0, 2), Position::new(0, 7));
//! assert_eq!(range.direction(), Direction::Forward);
//! ```

/// The direction of cursor movement or selection extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
  /// Moving toward the end of the document (increasing positions).
  Forward,
  /// Moving toward the start of the document (decreasing positions).
  Backward,
}
