//! # Header Definition Module
//!
//! Header definitions map file extensions to the header lines that belong in
//! those files. They are usually read from `.licenseheader` files:
//!
//! ```text
//! extensions: designer.cs generated.cs
//! extensions: .cs .cpp .h
//! // Copyright (c) %CurrentYear% Example Corp.
//!
//! extensions: .xml .config
//! <!-- Copyright (c) %CurrentYear% Example Corp. -->
//! ```
//!
//! Every `extensions:` line opens a section; the lines that follow, up to the
//! next `extensions:` line, are the header for all listed extensions. An empty
//! section (here: `designer.cs generated.cs`) means "these files get no
//! header".

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::trace;

use crate::language::normalize_extension;
use crate::line_endings;

/// Extension of header definition files. Files with this extension are never
/// edited.
pub const DEFINITION_FILE_EXTENSION: &str = ".licenseheader";

const SECTION_KEYWORD: &str = "extensions:";

/// Mapping from extension suffix (e.g. `.designer.cs`) to header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDefinitionMap {
  entries: BTreeMap<String, Vec<String>>,
}

impl HeaderDefinitionMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds or replaces the header for `extension`. The key is normalized to
  /// lower case with a leading dot.
  pub fn insert<I, S>(&mut self, extension: &str, lines: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let key = normalize_extension(extension);
    if key.is_empty() {
      return;
    }
    self.entries.insert(key, lines.into_iter().map(Into::into).collect());
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns the header lines for `file_name`.
  ///
  /// Among all keys that are a suffix of `file_name` (ignoring case) the
  /// longest wins, so `.generated.cs` takes precedence over `.cs` for
  /// `form.generated.cs`.
  pub fn lookup(&self, file_name: &str) -> Option<(&str, &[String])> {
    let file_name = file_name.to_lowercase();
    self
      .entries
      .iter()
      .filter(|(key, _)| file_name.ends_with(key.as_str()))
      .max_by_key(|(key, _)| key.len())
      .map(|(key, lines)| (key.as_str(), lines.as_slice()))
  }

  /// Parses the contents of a `.licenseheader` file.
  ///
  /// Lines before the first `extensions:` line are ignored. When `text` ends
  /// with a line break, the last section receives a trailing empty line.
  pub fn parse(text: &str) -> Self {
    let mut map = Self::new();
    let mut sections: Vec<(Vec<String>, Vec<String>)> = Vec::new();

    // `str::lines` does not split on a lone `\r`.
    let normalized = line_endings::replace_all(text, "\n");
    for line in normalized.lines() {
      if let Some(extensions) = strip_section_keyword(line) {
        let extensions = extensions.split_whitespace().map(normalize_extension).collect();
        sections.push((extensions, Vec::new()));
      } else if let Some((_, lines)) = sections.last_mut() {
        lines.push(line.to_string());
      }
    }

    if normalized.ends_with('\n')
      && let Some((_, lines)) = sections.last_mut()
    {
      lines.push(String::new());
    }

    for (extensions, lines) in sections {
      for extension in extensions {
        trace!("Header definition for {}: {} line(s)", extension, lines.len());
        map.insert(&extension, lines.clone());
      }
    }

    map
  }

  /// Reads and parses a `.licenseheader` file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid UTF-8.
  pub fn load(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read header definition file: {}", path.display()))?;
    Ok(Self::parse(&text))
  }
}

fn strip_section_keyword(line: &str) -> Option<&str> {
  let trimmed = line.trim_start();
  let prefix = trimmed.get(..SECTION_KEYWORD.len())?;
  prefix
    .eq_ignore_ascii_case(SECTION_KEYWORD)
    .then(|| &trimmed[SECTION_KEYWORD.len()..])
}

/// Returns `true` if `path` is a header definition file.
pub fn is_definition_file(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| name.to_lowercase().ends_with(DEFINITION_FILE_EXTENSION))
}
