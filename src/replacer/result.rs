//! Result and error types of the replacer.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::header::{DocumentError, HeaderAction};
use crate::language::LanguageError;

/// Category of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacerErrorKind {
  /// The desired header is not a valid comment for the file's language.
  NonCommentText,
  LanguageNotFound,
  /// The file's existing leading comment is malformed.
  ParsingError,
  NoHeaderFound,
  Miscellaneous,
  EmptyHeader,
  FileNotFound,
  /// The file is a header definition file and is never edited.
  LicenseHeaderDocument,
}

impl fmt::Display for ReplacerErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::NonCommentText => "non-comment text",
      Self::LanguageNotFound => "language not found",
      Self::ParsingError => "parsing error",
      Self::NoHeaderFound => "no header found",
      Self::Miscellaneous => "error",
      Self::EmptyHeader => "empty header",
      Self::FileNotFound => "file not found",
      Self::LicenseHeaderDocument => "header definition file",
    };
    f.write_str(name)
  }
}

/// A failed per-file operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ReplacerError {
  pub path: PathBuf,
  /// The input content, for content-mode operations.
  pub content: Option<String>,
  pub kind: ReplacerErrorKind,
  pub message: String,
}

impl ReplacerError {
  pub fn new(path: &Path, content: Option<&str>, kind: ReplacerErrorKind, message: impl Into<String>) -> Self {
    Self {
      path: path.to_path_buf(),
      content: content.map(str::to_string),
      kind,
      message: message.into(),
    }
  }

  pub(crate) fn from_document(path: &Path, content: Option<&str>, error: &DocumentError) -> Self {
    let kind = match error {
      DocumentError::Parse(_) => ReplacerErrorKind::ParsingError,
      DocumentError::InvalidOperation { .. } | DocumentError::Io { .. } => ReplacerErrorKind::Miscellaneous,
    };
    let message = match error {
      DocumentError::Parse(e) => format!("Failed to parse the existing header of {}: {e}", path.display()),
      other => other.to_string(),
    };
    Self::new(path, content, kind, message)
  }
}

/// A successful per-file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacerSuccess {
  pub path: PathBuf,
  /// The final content of the file.
  pub content: String,
  pub action: HeaderAction,
}

pub type ReplacerResult<T = ReplacerSuccess> = Result<T, ReplacerError>;

/// Reasons a [`HeaderDocument`](crate::header::HeaderDocument) cannot be
/// created for an input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateDocumentError {
  #[error("File not found: {}", path.display())]
  FileNotFound { path: PathBuf },

  #[error("{} is a header definition file and is not modified", path.display())]
  LicenseHeaderDocument { path: PathBuf },

  #[error("No language is configured for extension {extension} ({})", path.display())]
  LanguageNotFound { path: PathBuf, extension: String },

  #[error("Invalid language definition for {}: {source}", path.display())]
  InvalidLanguage {
    path: PathBuf,
    #[source]
    source: LanguageError,
  },

  #[error("No header is defined for extension {extension} ({})", path.display())]
  NoHeaderFound { path: PathBuf, extension: String },

  #[error("The header for extension {extension} is empty ({})", path.display())]
  EmptyHeader { path: PathBuf, extension: String },
}

impl CreateDocumentError {
  pub const fn kind(&self) -> ReplacerErrorKind {
    match self {
      Self::FileNotFound { .. } => ReplacerErrorKind::FileNotFound,
      Self::LicenseHeaderDocument { .. } => ReplacerErrorKind::LicenseHeaderDocument,
      Self::LanguageNotFound { .. } => ReplacerErrorKind::LanguageNotFound,
      Self::InvalidLanguage { .. } => ReplacerErrorKind::Miscellaneous,
      Self::NoHeaderFound { .. } => ReplacerErrorKind::NoHeaderFound,
      Self::EmptyHeader { .. } => ReplacerErrorKind::EmptyHeader,
    }
  }

  pub(crate) fn into_replacer_error(self, content: Option<&str>) -> ReplacerError {
    let path = match &self {
      Self::FileNotFound { path }
      | Self::LicenseHeaderDocument { path }
      | Self::LanguageNotFound { path, .. }
      | Self::InvalidLanguage { path, .. }
      | Self::NoHeaderFound { path, .. }
      | Self::EmptyHeader { path, .. } => path.clone(),
    };
    ReplacerError::new(&path, content, self.kind(), self.to_string())
  }
}

/// The batch was cancelled before all files were processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Operation was cancelled")]
pub struct Cancelled;

/// Outcome of a path-mode batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
  /// Number of files whose processing completed, successfully or not.
  pub processed: usize,
  /// Files whose content was changed on disk, with what was done to them.
  pub changed: Vec<(PathBuf, HeaderAction)>,
  pub errors: Vec<ReplacerError>,
  /// Highest number of files that were in flight at the same time.
  pub peak_parallelism: usize,
}

impl BatchReport {
  /// A batch succeeds iff no file failed.
  pub fn is_success(&self) -> bool {
    self.errors.is_empty()
  }
}

/// Outcome of a content-mode batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBatch {
  /// One entry per input a document could be created for, in completion
  /// order.
  pub results: Vec<ReplacerResult>,
  /// Highest number of inputs that were in flight at the same time.
  pub peak_parallelism: usize,
}
