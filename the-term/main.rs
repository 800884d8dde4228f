//! Scriptable front end for the pairing engine.
//!
//! Loads a file (or starts empty), places cursors, replays a key script
//! through [`AutoPairs::on_key`] with the rope document as host, and prints
//! the result:
//!
//! ```text
//! $ the-pairs --keys 'fn main(<ret>' --show-cursors
//! fn main(
//!     |
//! )
//! ```

mod input;
mod render;

use std::{
  io::{
    self,
    Read,
    Write,
  },
  path::PathBuf,
};

use clap::{
  ArgAction,
  Parser,
};
use eyre::{
  Result,
  WrapErr,
};
use smallvec::SmallVec;
use the_lib::{
  auto_pairs::AutoPairs,
  document::{
    DEFAULT_INDENT_WIDTH,
    Document,
  },
  input::KeyEvent,
  position::Position,
  selection::{
    Range,
    Selection,
  },
};

#[derive(Debug, Parser)]
#[command(name = "the-pairs")]
#[command(about = "Replay keystrokes through the bracket pairing engine")]
struct Cli {
  /// File to edit, `-` for stdin. Starts from an empty buffer when omitted
  file: Option<PathBuf>,

  /// Place a cursor at LINE:COL (1-based, repeatable)
  #[arg(short = 'C', long = "cursor", value_name = "LINE:COL", value_parser = input::parse_position)]
  cursors: Vec<Position>,

  /// Select from anchor to head (1-based, repeatable)
  #[arg(short = 's', long = "select", value_name = "LINE:COL-LINE:COL", value_parser = input::parse_range)]
  selections: Vec<Range>,

  /// Keys to replay, e.g. `foo(<ret>bar<bs>`
  #[arg(short = 'k', long = "keys", value_name = "SCRIPT", default_value = "")]
  keys: String,

  /// Columns per indent level
  #[arg(long = "indent-width", value_name = "N")]
  indent_width: Option<usize>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config_file: Option<PathBuf>,

  /// Turn the pairing engine off
  #[arg(long = "no-auto-pairs")]
  no_auto_pairs: bool,

  /// Mark cursors with `|` and selections with `[` `]` in the output
  #[arg(long = "show-cursors")]
  show_cursors: bool,

  /// Print the final cursors after the text
  #[arg(long = "print-selection")]
  print_selection: bool,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log-file", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

fn setup_logging(verbosity: u8) -> Result<()> {
  let mut base_config = fern::Dispatch::new();

  base_config = match verbosity {
    0 => base_config.level(log::LevelFilter::Warn),
    1 => base_config.level(log::LevelFilter::Info),
    2 => base_config.level(log::LevelFilter::Debug),
    _ => base_config.level(log::LevelFilter::Trace),
  };

  // file logs carry a timestamp and the target
  let file_config = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        std::time::SystemTime::now()
          .duration_since(std::time::UNIX_EPOCH)
          .map(|elapsed| elapsed.as_millis())
          .unwrap_or_default(),
        record.target(),
        record.level(),
        message
      ))
    })
    .chain(fern::log_file(the_loader::log_file()).wrap_err("failed to open log file")?);

  base_config
    .chain(file_config)
    .apply()
    .wrap_err("failed to install logger")
}

fn read_document(file: Option<&PathBuf>) -> Result<Document> {
  let text = match file {
    Some(path) if path.as_os_str() == "-" => {
      let mut text = String::new();
      io::stdin()
        .read_to_string(&mut text)
        .wrap_err("failed to read stdin")?;
      text
    },
    Some(path) => std::fs::read_to_string(path)
      .wrap_err_with(|| format!("failed to read {}", path.display()))?,
    None => String::new(),
  };
  Ok(Document::from(text.as_str()))
}

fn build_selection(cli: &Cli) -> Option<Selection> {
  let ranges: SmallVec<[Range; 1]> = cli
    .cursors
    .iter()
    .copied()
    .map(Range::point)
    .chain(cli.selections.iter().copied())
    .collect();
  Selection::new(ranges).ok()
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  the_loader::initialize_log_file(cli.log_file.clone());
  the_loader::initialize_config_file(cli.config_file.clone());
  setup_logging(cli.verbosity)?;

  let config = the_loader::config::load_config(cli.config_file.as_deref())?;
  let pairs: AutoPairs = config
    .auto_pairs
    .build()
    .wrap_err("invalid auto-pairs table")?;
  let pairs = if cli.no_auto_pairs {
    pairs.with_enabled(false)
  } else {
    pairs
  };

  let indent_width = cli
    .indent_width
    .or(config.auto_pairs.indent_width)
    .unwrap_or(DEFAULT_INDENT_WIDTH);
  let mut doc = read_document(cli.file.as_ref())?.with_indent_width(indent_width);

  if let Some(selection) = build_selection(&cli) {
    doc
      .set_selection(selection)
      .wrap_err("cursor outside the document")?;
  }

  let keys = input::parse_keys(&cli.keys)?;
  log::info!("replaying {} keys", keys.len());
  for event in keys {
    replay(&pairs, &mut doc, event)?;
  }

  let rendered = render::render(&doc, cli.show_cursors)?;
  let mut stdout = io::stdout().lock();
  stdout.write_all(rendered.as_bytes())?;
  if cli.print_selection {
    if !rendered.ends_with('\n') {
      writeln!(stdout)?;
    }
    stdout.write_all(render::describe_selection(&doc).as_bytes())?;
  }
  stdout.flush()?;
  Ok(())
}

/// Offer `event` to the engine and fall back to the document's default
/// handling when it passes.
fn replay(pairs: &AutoPairs, doc: &mut Document, event: KeyEvent) -> Result<()> {
  let outcome = pairs
    .on_key(doc, event)
    .wrap_err_with(|| format!("failed to apply {event:?}"))?;
  log::debug!("{event:?} -> {outcome:?}");

  if !outcome.is_handled() {
    doc
      .apply_default_key(event)
      .wrap_err_with(|| format!("failed to apply {event:?}"))?;
  }
  Ok(())
}
