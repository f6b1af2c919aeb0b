//! # Output Module
//!
//! This module centralizes all user-facing output of the lhm binary. It
//! provides consistent formatting, colors, and symbols for terminal output.
//!
//! - In normal mode changed files are listed (truncated to a limit)
//! - With `-v` every list is shown in full, plus timing
//! - With `-q` only changed paths are printed, one per line, for scripting

use std::path::{Path, PathBuf};
use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

use crate::header::HeaderAction;
use crate::info_log;
use crate::logging::{is_quiet, is_verbose, print_error_log};
use crate::replacer::{ReplacerError, ReplacerErrorKind};

/// Symbols used in output
pub mod symbols {
  /// Success
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Header replaced
  pub const UPDATED: &str = "\u{21bb}"; // ↻
  /// Header removed
  pub const REMOVED: &str = "-";
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Outcome of one run, grouped for display.
#[derive(Debug, Default)]
pub struct RunSummary {
  pub inserted: Vec<PathBuf>,
  pub replaced: Vec<PathBuf>,
  pub removed: Vec<PathBuf>,
  pub unchanged: usize,
  /// Files that were not processed on purpose, e.g. header definition files.
  pub skipped: usize,
  pub errors: Vec<ReplacerError>,
  pub processing_time: Duration,
}

impl RunSummary {
  /// Files that changed or would change.
  pub fn changed_count(&self) -> usize {
    self.inserted.len() + self.replaced.len() + self.removed.len()
  }

  /// Records a successful file.
  pub fn record_action(&mut self, path: PathBuf, action: HeaderAction) {
    match action {
      HeaderAction::Inserted => self.inserted.push(path),
      HeaderAction::Replaced => self.replaced.push(path),
      HeaderAction::Removed => self.removed.push(path),
      HeaderAction::Unchanged => self.unchanged += 1,
    }
  }

  /// Records a failed file. Header definition files and empty headers count
  /// as skipped, not as errors.
  pub fn record_error(&mut self, error: ReplacerError) {
    if is_skip_kind(error.kind) {
      self.skipped += 1;
    } else {
      self.errors.push(error);
    }
  }
}

/// Error kinds that mean "nothing to do" rather than a failure.
pub const fn is_skip_kind(kind: ReplacerErrorKind) -> bool {
  matches!(
    kind,
    ReplacerErrorKind::LicenseHeaderDocument | ReplacerErrorKind::EmptyHeader
  )
}

/// Print the initial "Checking N files..." or "Processing N files..." message.
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print the groups of changed files.
///
/// `dry_run` switches the wording to "would".
pub fn print_changed_files(summary: &RunSummary, root: Option<&Path>, dry_run: bool) {
  let groups = [
    (symbols::SUCCESS, "Inserted header in", "Would insert header in", &summary.inserted),
    (symbols::UPDATED, "Replaced header in", "Would replace header in", &summary.replaced),
    (symbols::REMOVED, "Removed header from", "Would remove header from", &summary.removed),
  ];

  for (symbol, done, planned, files) in groups {
    if files.is_empty() {
      continue;
    }

    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort();

    if is_quiet() {
      for file in sorted {
        println!("{}", make_relative_path(file, root));
      }
      continue;
    }

    let count = sorted.len();
    println!(
      "{} {} {} {}:",
      symbol.if_supports_color(Stream::Stdout, |s| s.green()),
      if dry_run { planned } else { done },
      count,
      plural(count)
    );

    let show_all = is_verbose();
    let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };
    for file in sorted.iter().take(limit) {
      println!("  {}", make_relative_path(file, root));
    }

    if !show_all && count > limit {
      println!(
        "  {} ... and {} more (use -v to see all)",
        "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
        count - limit
      );
    }
  }
}

/// Print every failed file to stderr. Shown even in quiet mode.
pub fn print_errors(errors: &[ReplacerError]) {
  if errors.is_empty() {
    return;
  }

  let mut sorted: Vec<&ReplacerError> = errors.iter().collect();
  sorted.sort_by(|a, b| a.path.cmp(&b.path));

  print_error_log(&format!(
    "{} {} {} failed:",
    symbols::FAILURE,
    sorted.len(),
    plural(sorted.len())
  ));
  for error in sorted {
    eprintln!("  [{}] {}", error.kind, error.message);
  }
}

/// Print the processing summary.
///
/// Format: "Summary: X changed, Y unchanged, Z skipped, W failed"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &RunSummary, dry_run: bool) {
  if is_quiet() {
    return;
  }

  let changed = summary.changed_count();
  let failed = summary.errors.len();

  let changed_str = changed.if_supports_color(Stream::Stdout, |s| s.cyan());
  let failed_str = if failed > 0 {
    failed.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    failed.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };
  let skipped_str = summary.skipped.if_supports_color(Stream::Stdout, |s| s.dimmed());

  let mut summary_line = format!(
    "Summary: {} {}, {} unchanged, {} skipped, {} failed",
    changed_str,
    if dry_run { "to change" } else { "changed" },
    summary.unchanged,
    skipped_str,
    failed_str
  );

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{summary_line}");
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  info_log!("{message}");
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Make a path relative to `root` for display.
fn make_relative_path(path: &Path, root: Option<&Path>) -> String {
  root
    .and_then(|root| path.strip_prefix(root).ok())
    .unwrap_or(path)
    .to_string_lossy()
    .to_string()
}
