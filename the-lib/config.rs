//! User-facing switches for the pairing engine.
//!
//! ```toml
//! [auto-pairs]
//! enable = true
//! pairs = ["()", "[]", "{}", "''", "\"\"", "``"]
//! # falls back to the host's indent setting when unset
//! indent-width = 2
//! ```

use serde::{
  Deserialize,
  Serialize,
};

use crate::auto_pairs::{
  AutoPairs,
  DEFAULT_PAIRS,
  DelimiterTable,
  Pair,
  TableError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
  pub auto_pairs: AutoPairsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AutoPairsConfig {
  pub enable:       bool,
  /// Two-character strings, opener first. `None` keeps the built-in table.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pairs:        Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub indent_width: Option<usize>,
}

impl Default for AutoPairsConfig {
  fn default() -> Self {
    Self {
      enable:       true,
      pairs:        None,
      indent_width: None,
    }
  }
}

impl AutoPairsConfig {
  pub fn table(&self) -> Result<DelimiterTable, TableError> {
    match &self.pairs {
      Some(pairs) => {
        let pairs = pairs
          .iter()
          .map(|pair| Pair::try_from(pair.as_str()))
          .collect::<Result<Vec<_>, _>>()?;
        DelimiterTable::new(pairs)
      },
      None => DelimiterTable::new(DEFAULT_PAIRS.iter()),
    }
  }

  pub fn build(&self) -> Result<AutoPairs, TableError> {
    Ok(
      AutoPairs::new(self.table()?)
        .with_enabled(self.enable)
        .with_indent_width(self.indent_width),
    )
  }
}

impl Config {
  pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(source)
  }
}
