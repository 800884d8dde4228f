pub mod config;

use std::{
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

const APP_NAME: &str = "the-pairs";

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  ensure_parent_dir(&config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

pub fn config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("THE_PAIRS_CONFIG_DIR") {
    return expand_tilde(Path::new(&dir));
  }
  let mut path = match choose_base_strategy() {
    Ok(strategy) => strategy.config_dir(),
    Err(err) => {
      log::warn!("unable to find the config directory: {err}");
      std::env::temp_dir()
    },
  };
  path.push(APP_NAME);
  path
}

pub fn cache_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("THE_PAIRS_CACHE_DIR") {
    return expand_tilde(Path::new(&dir));
  }
  let mut path = match choose_base_strategy() {
    Ok(strategy) => strategy.cache_dir(),
    Err(err) => {
      log::warn!("unable to find the cache directory: {err}");
      std::env::temp_dir()
    },
  };
  path.push(APP_NAME);
  path
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE
    .get_or_init(|| {
      let path = default_config_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn log_file() -> PathBuf {
  LOG_FILE
    .get_or_init(|| {
      let path = default_log_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn workspace_config_file() -> PathBuf {
  find_workspace().0.join(".the-pairs").join("config.toml")
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("the-pairs.log")
}

/// Merge two TOML documents, merging values from `right` onto `left`
///
/// `merge_depth` sets the nesting depth up to which values are merged instead
/// of overridden.
///
/// When a table exists in both `left` and `right`, the merged table consists of
/// all keys in `left`'s table unioned with all keys in `right` with the values
/// of `right` being merged recursively onto values of `left`. Arrays are
/// always taken from `right` whole, so a user's pair list replaces the
/// default one instead of extending it.
///
/// `crate::merge_toml_values(a, b, 2)` combines, for example:
///
/// a:
/// ```toml
/// [auto-pairs]
/// enable = true
/// pairs = ["()", "[]"]
/// ```
/// b:
/// ```toml
/// [auto-pairs]
/// pairs = ["<>"]
/// ```
///
/// into:
/// ```toml
/// [auto-pairs]
/// enable = true
/// pairs = ["<>"]
/// ```
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) => {
      if merge_depth > 0 {
        for (rname, rvalue) in right_map {
          match left_map.remove(&rname) {
            Some(lvalue) => {
              let merged_value = merge_toml_values(lvalue, rvalue, merge_depth - 1);
              left_map.insert(rname, merged_value);
            },
            None => {
              left_map.insert(rname, rvalue);
            },
          }
        }
        Value::Table(left_map)
      } else {
        Value::Table(right_map)
      }
    },
    // Catch everything else we didn't handle, and use the right value
    (_, value) => value,
  }
}

/// Finds the current workspace folder.
///
/// This function starts searching the FS upward from the CWD
/// and returns the first directory that contains either `.git`, `.jj`
/// or `.the-pairs`. If no workspace was found returns (CWD, true).
/// Otherwise (workspace, false) is returned
pub fn find_workspace() -> (PathBuf, bool) {
  match std::env::current_dir() {
    Ok(current_dir) => find_workspace_in(current_dir),
    Err(_) => (PathBuf::new(), true),
  }
}

pub fn find_workspace_in(dir: impl AsRef<Path>) -> (PathBuf, bool) {
  let dir = dir.as_ref();
  for ancestor in dir.ancestors() {
    if ancestor.join(".git").exists()
      || ancestor.join(".jj").exists()
      || ancestor.join(".the-pairs").exists()
    {
      return (ancestor.to_owned(), false);
    }
  }

  (dir.to_owned(), true)
}

fn default_config_file() -> PathBuf {
  config_dir().join("config.toml")
}

fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent()
    && !parent.exists()
  {
    std::fs::create_dir_all(parent).ok();
  }
}

/// Replace a leading `~` with the home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let mut components = path.components();
  if let Some(std::path::Component::Normal(first)) = components.next()
    && first == "~"
    && let Ok(mut home) = etcetera::home_dir()
  {
    home.push(components.as_path());
    return home;
  }
  path.to_owned()
}

#[cfg(test)]
mod merge_toml_tests {
  use toml::Value;

  use super::merge_toml_values;

  #[test]
  fn auto_pairs_table_merges() {
    const BASE: &str = r#"
        [auto-pairs]
        enable = true
        pairs = ["()", "[]"]
        "#;
    const USER: &str = r#"
        [auto-pairs]
        indent-width = 2
        pairs = ["<>"]
        "#;

    let base: Value = toml::from_str(BASE).unwrap();
    let user: Value = toml::from_str(USER).unwrap();

    let merged = merge_toml_values(base, user, 2);
    let table = merged.get("auto-pairs").unwrap();
    // arrays below the merge depth are replaced, not appended
    assert_eq!(
      table.get("pairs").unwrap().as_array().unwrap(),
      &vec![Value::String("<>".into())]
    );
    assert_eq!(table.get("indent-width").unwrap().as_integer(), Some(2));
    // untouched keys survive
    assert_eq!(table.get("enable").unwrap().as_bool(), Some(true));
  }

  #[test]
  fn pair_lists_are_replaced_at_any_depth() {
    const BASE: &str = r#"
        [auto-pairs]
        pairs = ["()", "[]"]
        "#;
    const USER: &str = r#"
        [auto-pairs]
        pairs = ["<>"]
        "#;

    let base: Value = toml::from_str(BASE).unwrap();
    let user: Value = toml::from_str(USER).unwrap();

    let merged = merge_toml_values(base, user, 8);
    assert_eq!(
      merged["auto-pairs"]["pairs"].as_array().unwrap(),
      &vec![Value::String("<>".into())]
    );
  }
}
