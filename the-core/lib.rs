//! Character and line primitives shared by the pairing engine and its hosts.

pub mod chars;
pub mod line_ending;
