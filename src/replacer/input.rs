//! Per-file inputs of the replacer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::header::{AdditionalProperty, HeaderDefinitionMap};

/// Common view on [`PathInput`] and [`ContentInput`].
pub trait ReplacerInput {
  fn path(&self) -> &Path;

  /// The header definitions to apply. `None` removes existing headers.
  fn headers(&self) -> Option<&HeaderDefinitionMap>;

  fn properties(&self) -> &[AdditionalProperty];

  /// Insert the header even if it is not a valid comment.
  fn ignore_non_comment_text(&self) -> bool;

  /// The in-memory content, for content-mode inputs.
  fn content(&self) -> Option<&str>;
}

/// A file that is read from and written to disk.
#[derive(Debug, Clone, Default)]
pub struct PathInput {
  pub path: PathBuf,
  pub headers: Option<Arc<HeaderDefinitionMap>>,
  pub properties: Vec<AdditionalProperty>,
  pub ignore_non_comment_text: bool,
}

impl PathInput {
  pub fn new(path: impl Into<PathBuf>, headers: Option<Arc<HeaderDefinitionMap>>) -> Self {
    Self {
      path: path.into(),
      headers,
      ..Self::default()
    }
  }

  pub fn with_properties(mut self, properties: Vec<AdditionalProperty>) -> Self {
    self.properties = properties;
    self
  }

  pub fn with_ignore_non_comment_text(mut self, ignore: bool) -> Self {
    self.ignore_non_comment_text = ignore;
    self
  }
}

impl ReplacerInput for PathInput {
  fn path(&self) -> &Path {
    &self.path
  }

  fn headers(&self) -> Option<&HeaderDefinitionMap> {
    self.headers.as_deref()
  }

  fn properties(&self) -> &[AdditionalProperty] {
    &self.properties
  }

  fn ignore_non_comment_text(&self) -> bool {
    self.ignore_non_comment_text
  }

  fn content(&self) -> Option<&str> {
    None
  }
}

/// A file whose content is held in memory. `path` identifies it and decides
/// its language; the file need not exist.
#[derive(Debug, Clone, Default)]
pub struct ContentInput {
  pub path: PathBuf,
  pub content: String,
  pub headers: Option<Arc<HeaderDefinitionMap>>,
  pub properties: Vec<AdditionalProperty>,
  pub ignore_non_comment_text: bool,
}

impl ContentInput {
  pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, headers: Option<Arc<HeaderDefinitionMap>>) -> Self {
    Self {
      path: path.into(),
      content: content.into(),
      headers,
      ..Self::default()
    }
  }

  pub fn with_properties(mut self, properties: Vec<AdditionalProperty>) -> Self {
    self.properties = properties;
    self
  }

  pub fn with_ignore_non_comment_text(mut self, ignore: bool) -> Self {
    self.ignore_non_comment_text = ignore;
    self
  }
}

impl ReplacerInput for ContentInput {
  fn path(&self) -> &Path {
    &self.path
  }

  fn headers(&self) -> Option<&HeaderDefinitionMap> {
    self.headers.as_deref()
  }

  fn properties(&self) -> &[AdditionalProperty] {
    &self.properties
  }

  fn ignore_non_comment_text(&self) -> bool {
    self.ignore_non_comment_text
  }

  fn content(&self) -> Option<&str> {
    Some(&self.content)
  }
}
