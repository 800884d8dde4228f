use std::{
  io::ErrorKind,
  path::{
    Path,
    PathBuf,
  },
};

use eyre::{
  Context,
  Result,
};
use the_lib::config::Config;

/// Tables merge, everything inside `[auto-pairs]` is replaced wholesale.
const MERGE_DEPTH: usize = 2;

/// Default built-in config.toml.
pub fn default_config() -> Result<toml::Value> {
  toml::from_str(include_str!("config.toml")).context("failed to parse built-in config.toml")
}

/// The built-in defaults merged with the user file (`path` if given, else
/// [`crate::config_file`]) and the workspace file.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
  let user = path.map_or_else(crate::config_file, Path::to_path_buf);
  load_config_files([user, crate::workspace_config_file()])
}

/// Merge `files` onto the defaults in order. Missing files are skipped.
pub fn load_config_files(files: impl IntoIterator<Item = PathBuf>) -> Result<Config> {
  let merged = files
    .into_iter()
    .filter_map(|file| read_config_file(&file).transpose())
    .collect::<Result<Vec<_>>>()?
    .into_iter()
    .fold(default_config()?, |a, b| {
      crate::merge_toml_values(a, b, MERGE_DEPTH)
    });

  merged.try_into::<Config>().context("invalid configuration")
}

fn read_config_file(file: &Path) -> Result<Option<toml::Value>> {
  let source = match std::fs::read_to_string(file) {
    Ok(source) => source,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
    Err(err) => return Err(err).wrap_err_with(|| format!("failed to read {}", file.display())),
  };

  log::debug!("loading config from {}", file.display());
  toml::from_str(&source)
    .map(Some)
    .wrap_err_with(|| format!("failed to parse {}", file.display()))
}
