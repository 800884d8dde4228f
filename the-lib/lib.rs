use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod auto_pairs;
pub mod config;
pub mod document;
pub mod host;
pub mod input;
pub mod movement;
pub mod position;
pub mod selection;
pub mod transaction;

pub type Tendril = SmartString<LazyCompact>;
