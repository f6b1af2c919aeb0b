//! # Diff Module
//!
//! This module renders the difference between a file's current content and
//! the content a header operation would produce. It backs the `--show-diff`
//! and `--save-diff` options of dry runs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Manages diff creation and rendering for header changes.
///
/// This struct handles:
/// - Generating line diffs between original and modified content
/// - Displaying diffs to stderr with colorization
/// - Appending diffs to a file
#[derive(Debug, Clone, Default)]
pub struct DiffManager {
  /// Whether to show diffs on stderr
  pub show_diff: bool,

  /// File that collects the diffs of all changed files
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Returns `true` if diffs are shown or saved.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Displays and/or saves the diff between `original` and `new`.
  ///
  /// Diffs of several files are appended to the same diff file.
  ///
  /// # Parameters
  ///
  /// * `path` - Path of the file being processed
  /// * `original` - Current file content
  /// * `new` - Content after the header operation
  ///
  /// # Errors
  ///
  /// Returns an error if the diff file cannot be opened or written.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    let diff_content = render_diff(path, original, new);

    if self.show_diff {
      for line in diff_content.split_inclusive('\n') {
        match line.chars().next() {
          Some('+') => eprint!("{}", line.if_supports_color(Stream::Stderr, |l| l.green())),
          Some('-') => eprint!("{}", line.if_supports_color(Stream::Stderr, |l| l.red())),
          _ => eprint!("{line}"),
        }
      }
    }

    if let Some(diff_path) = &self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(diff_content.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}

/// Renders a line diff with a `Diff for <path>:` heading.
///
/// Lines are prefixed with `-`, `+` or a space. A final line without a line
/// break gets one, so the output always ends with a newline.
pub fn render_diff(path: &Path, original: &str, new: &str) -> String {
  let diff = TextDiff::from_lines(original, new);
  let mut diff_content = format!("Diff for {}:\n", path.display());

  for change in diff.iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    diff_content.push_str(sign);
    diff_content.push_str(&change.to_string_lossy());
    if change.missing_newline() {
      diff_content.push('\n');
    }
  }

  diff_content.push('\n');
  diff_content
}
