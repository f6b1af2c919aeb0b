//! # Header Properties Module
//!
//! Literal token substitution for header lines. Header definitions may contain
//! tokens such as `%CurrentYear%` or `%FileName%`; they are replaced before the
//! header is compared with or written into a file.
//!
//! Caller-supplied [`AdditionalProperty`] values are applied first, so they can
//! override any built-in token.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local};
use tracing::trace;

/// A caller-defined token and its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalProperty {
  /// The token as it appears in the header, e.g. `%Project%`.
  pub token: String,
  pub value: String,
}

impl AdditionalProperty {
  pub fn new(token: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      token: token.into(),
      value: value.into(),
    }
  }
}

/// Expands tokens in header lines for one document.
pub struct PropertyExpander<'a> {
  path: &'a Path,
  additional: &'a [AdditionalProperty],
  now: DateTime<Local>,
}

impl<'a> PropertyExpander<'a> {
  pub fn new(path: &'a Path, additional: &'a [AdditionalProperty]) -> Self {
    Self {
      path,
      additional,
      now: Local::now(),
    }
  }

  /// Uses a fixed point in time for the `%Current*%` tokens.
  pub fn at(mut self, now: DateTime<Local>) -> Self {
    self.now = now;
    self
  }

  /// Returns `lines` with all known tokens replaced.
  ///
  /// Tokens whose value cannot be determined (e.g. `%CreationYear%` for a file
  /// that does not exist) are left untouched.
  pub fn expand(&self, lines: &[String]) -> Vec<String> {
    let built_in = self.built_in_properties();
    lines
      .iter()
      .map(|line| {
        let mut expanded = line.clone();
        for property in self.additional.iter().chain(built_in.iter()) {
          if expanded.contains(&property.token) {
            expanded = expanded.replace(&property.token, &property.value);
          }
        }
        expanded
      })
      .collect()
  }

  fn built_in_properties(&self) -> Vec<AdditionalProperty> {
    let mut properties = vec![
      AdditionalProperty::new("%FullFileName%", self.path.display().to_string()),
      AdditionalProperty::new(
        "%FileName%",
        self
          .path
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
          .unwrap_or_default(),
      ),
      AdditionalProperty::new("%CurrentYear%", self.now.year().to_string()),
      AdditionalProperty::new("%CurrentMonth%", format!("{:02}", self.now.month())),
      AdditionalProperty::new("%CurrentDay%", format!("{:02}", self.now.day())),
      AdditionalProperty::new("%CurrentTime%", self.now.format("%H:%M:%S").to_string()),
    ];

    if let Some(created) = creation_time(self.path) {
      properties.extend([
        AdditionalProperty::new("%CreationYear%", created.year().to_string()),
        AdditionalProperty::new("%CreationMonth%", format!("{:02}", created.month())),
        AdditionalProperty::new("%CreationDay%", format!("{:02}", created.day())),
        AdditionalProperty::new("%CreationTime%", created.format("%H:%M:%S").to_string()),
      ]);
    } else {
      trace!("No creation time available for {}", self.path.display());
    }

    if let Some(user) = user_name() {
      properties.push(AdditionalProperty::new("%UserName%", user));
    }

    properties
  }
}

fn creation_time(path: &Path) -> Option<DateTime<Local>> {
  let created: SystemTime = std::fs::metadata(path).ok()?.created().ok()?;
  Some(DateTime::<Local>::from(created))
}

fn user_name() -> Option<String> {
  ["USER", "USERNAME"]
    .iter()
    .find_map(|var| std::env::var(var).ok().filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn fixed_now() -> DateTime<Local> {
    Local
      .with_ymd_and_hms(2025, 3, 7, 9, 5, 1)
      .single()
      .expect("valid fixed date")
  }

  #[test]
  fn test_expands_current_date_tokens() {
    let path = Path::new("src/main.rs");
    let expander = PropertyExpander::new(path, &[]).at(fixed_now());
    let lines = vec!["// Copyright (c) %CurrentYear%-%CurrentMonth%-%CurrentDay% %CurrentTime%".to_string()];

    assert_eq!(expander.expand(&lines), vec!["// Copyright (c) 2025-03-07 09:05:01".to_string()]);
  }

  #[test]
  fn test_expands_file_name_tokens() {
    let path = Path::new("src/main.rs");
    let expander = PropertyExpander::new(path, &[]).at(fixed_now());
    let lines = vec!["// %FileName%".to_string(), "// %FullFileName%".to_string()];

    let expanded = expander.expand(&lines);
    assert_eq!(expanded[0], "// main.rs");
    assert_eq!(expanded[1], format!("// {}", path.display()));
  }

  #[test]
  fn test_additional_properties_take_precedence() {
    let path = Path::new("main.rs");
    let additional = [
      AdditionalProperty::new("%Project%", "lhm"),
      AdditionalProperty::new("%CurrentYear%", "1999"),
    ];
    let expander = PropertyExpander::new(path, &additional).at(fixed_now());

    let expanded = expander.expand(&["// %Project% %CurrentYear%".to_string()]);
    assert_eq!(expanded, vec!["// lhm 1999".to_string()]);
  }

  #[test]
  fn test_unknown_tokens_are_kept() {
    let path = Path::new("does/not/exist.rs");
    let expander = PropertyExpander::new(path, &[]).at(fixed_now());

    let expanded = expander.expand(&["// %Unknown% %CreationYear%".to_string()]);
    assert_eq!(expanded, vec!["// %Unknown% %CreationYear%".to_string()]);
  }
}
