//! # Header Document Module
//!
//! A [`HeaderDocument`] decides, for one file, whether the desired header has to
//! be inserted, replaced or removed, and produces the new text.
//!
//! A document is built once per file and operation. It either owns the file's
//! content (content mode) or refers to a file on disk (path mode); the two
//! modes are exclusive. Every decision is derived from a single snapshot of the
//! text: [`HeaderDocument::rewrite_text`] is a pure function of that snapshot.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

use super::{file_io, preparer};
use crate::comment_parser::{CommentParser, ParseError};
use crate::language::{Language, LanguageError};
use crate::line_endings::{self, LineEnding};

/// Error type for header document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
  /// The operation does not fit the document's access mode.
  #[error("{operation} is not available for {mode} documents")]
  InvalidOperation {
    operation: &'static str,
    mode: AccessMode,
  },

  /// The existing leading comment of the file is malformed.
  #[error(transparent)]
  Parse(#[from] ParseError),

  /// Reading or writing the file failed.
  #[error("Failed to access {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// How a document accesses its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
  /// The text is held in memory and never written to disk.
  Content,
  /// The text is read from and written to the file.
  Path,
}

impl fmt::Display for AccessMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Content => write!(f, "content-mode"),
      Self::Path => write!(f, "path-mode"),
    }
  }
}

/// What [`HeaderDocument::rewrite_text`] did to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
  Inserted,
  Replaced,
  Removed,
  /// The text already has the desired state.
  Unchanged,
}

impl HeaderAction {
  pub const fn is_change(self) -> bool {
    !matches!(self, Self::Unchanged)
  }
}

/// Result of rewriting one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
  pub action: HeaderAction,
  /// The complete new text, including any skipped prefix.
  pub content: String,
}

#[derive(Debug, Clone)]
enum Source {
  Content(String),
  Path,
}

/// Header state machine for one file.
#[derive(Debug, Clone)]
pub struct HeaderDocument {
  path: PathBuf,
  source: Source,
  parser: CommentParser,
  skip_expression: Option<Regex>,
  header_lines: Option<Vec<String>>,
  keywords: Vec<String>,
}

impl HeaderDocument {
  /// Creates a path-mode document.
  ///
  /// `header_lines` of `None` means the existing header is removed.
  ///
  /// # Errors
  ///
  /// Returns an error if the skip expression of `language` does not compile.
  pub fn for_path(
    path: impl Into<PathBuf>,
    language: &Language,
    header_lines: Option<Vec<String>>,
    keywords: &[String],
  ) -> Result<Self, LanguageError> {
    Self::build(path.into(), Source::Path, language, header_lines, keywords)
  }

  /// Creates a content-mode document. `path` only identifies the document.
  ///
  /// # Errors
  ///
  /// Returns an error if the skip expression of `language` does not compile.
  pub fn for_content(
    path: impl Into<PathBuf>,
    content: impl Into<String>,
    language: &Language,
    header_lines: Option<Vec<String>>,
    keywords: &[String],
  ) -> Result<Self, LanguageError> {
    Self::build(
      path.into(),
      Source::Content(content.into()),
      language,
      header_lines,
      keywords,
    )
  }

  fn build(
    path: PathBuf,
    source: Source,
    language: &Language,
    header_lines: Option<Vec<String>>,
    keywords: &[String],
  ) -> Result<Self, LanguageError> {
    Ok(Self {
      path,
      source,
      parser: CommentParser::for_language(language),
      skip_expression: language.compile_skip_expression()?,
      header_lines,
      keywords: keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Returns the desired header joined with `ending`, including a trailing
  /// line ending, or `None` in remove mode.
  pub fn header_text(&self, ending: LineEnding) -> Option<String> {
    self.header_lines.as_ref().map(|lines| {
      let ending = ending.as_str();
      let mut text = lines.join(ending);
      text.push_str(ending);
      text
    })
  }

  /// Returns `true` if the desired header is itself valid comment syntax for
  /// the document's language.
  ///
  /// A missing or empty header is always valid.
  pub fn validate_header(&self) -> bool {
    match self.header_text(LineEnding::Lf) {
      Some(header) if !header.trim().is_empty() => self.parser.is_complete_header(&header),
      _ => true,
    }
  }

  /// Loads the document's text. Path-mode documents read the file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read.
  pub async fn load(&self) -> Result<String, DocumentError> {
    match &self.source {
      Source::Content(content) => Ok(content.clone()),
      Source::Path => file_io::read_full_content(&self.path)
        .await
        .map_err(|source| self.io_error(source)),
    }
  }

  /// Computes the new text for `text`.
  ///
  /// Any prefix matched by the language's skip expression is kept as is. An
  /// existing header is only replaced or removed when it contains one of the
  /// keywords (if any were given).
  ///
  /// # Errors
  ///
  /// Returns an error if the leading comment of `text` is malformed.
  pub fn rewrite_text(&self, text: &str) -> Result<Rewrite, ParseError> {
    let (skipped, body) = self.split_skipped(text);
    let ending = line_endings::detect_dominant(text);

    let desired = self.header_text(ending);
    let mut existing = self.parser.parse(body)?;
    // The desired header is never gated, or a header without a keyword would
    // be inserted again on every run.
    if desired.as_deref() == Some(existing) && !existing.is_empty() {
      return Ok(Rewrite {
        action: HeaderAction::Unchanged,
        content: text.to_string(),
      });
    }
    if !existing.is_empty() && !self.passes_keyword_gate(existing) {
      trace!("Existing header of {} contains no keyword", self.path.display());
      existing = "";
    }
    let rest = &body[existing.len()..];

    let (action, new_body) = match desired {
      Some(header) if header == existing => (HeaderAction::Unchanged, None),
      Some(header) => {
        let mut new_body = preparer::prepare(&header, rest, &self.parser)?;
        new_body.push_str(rest);
        let action = if existing.is_empty() {
          HeaderAction::Inserted
        } else {
          HeaderAction::Replaced
        };
        (action, Some(new_body))
      }
      None if existing.is_empty() => (HeaderAction::Unchanged, None),
      None => (HeaderAction::Removed, Some(rest.to_string())),
    };

    let Some(new_body) = new_body else {
      return Ok(Rewrite {
        action,
        content: text.to_string(),
      });
    };

    let content = format!("{skipped}{new_body}");
    let action = if content == text { HeaderAction::Unchanged } else { action };
    debug!("{}: {:?}", self.path.display(), action);

    Ok(Rewrite { action, content })
  }

  /// Rewrites a content-mode document.
  ///
  /// # Errors
  ///
  /// Returns an error if the document is in path mode or its leading comment
  /// is malformed.
  pub fn rewrite_content(&self) -> Result<Rewrite, DocumentError> {
    match &self.source {
      Source::Content(content) => Ok(self.rewrite_text(content)?),
      Source::Path => Err(DocumentError::InvalidOperation {
        operation: "rewrite_content",
        mode: AccessMode::Path,
      }),
    }
  }

  /// Rewrites a path-mode document in place. The file is only written when
  /// its content changes.
  ///
  /// # Errors
  ///
  /// Returns an error if the document is in content mode, the file cannot be
  /// read or written, or its leading comment is malformed.
  pub async fn rewrite_file(&self) -> Result<Rewrite, DocumentError> {
    if let Source::Content(_) = self.source {
      return Err(DocumentError::InvalidOperation {
        operation: "rewrite_file",
        mode: AccessMode::Content,
      });
    }

    let text = self.load().await?;
    let rewrite = self.rewrite_text(&text)?;
    self.store(&rewrite).await?;
    Ok(rewrite)
  }

  /// Writes `rewrite` to disk if it changes a path-mode document.
  ///
  /// # Errors
  ///
  /// Returns an error if the document is in content mode or the write fails.
  pub async fn store(&self, rewrite: &Rewrite) -> Result<(), DocumentError> {
    if let Source::Content(_) = self.source {
      return Err(DocumentError::InvalidOperation {
        operation: "store",
        mode: AccessMode::Content,
      });
    }

    if rewrite.action.is_change() {
      file_io::write_file(&self.path, &rewrite.content)
        .await
        .map_err(|source| self.io_error(source))?;
    }

    Ok(())
  }

  fn split_skipped<'a>(&self, text: &'a str) -> (&'a str, &'a str) {
    let skipped_len = self
      .skip_expression
      .as_ref()
      .and_then(|regex| regex.find(text))
      .filter(|found| found.start() == 0)
      .map_or(0, |found| found.end());
    text.split_at(skipped_len)
  }

  fn passes_keyword_gate(&self, header: &str) -> bool {
    if self.keywords.is_empty() {
      return true;
    }
    let header = header.to_lowercase();
    self.keywords.iter().any(|keyword| header.contains(keyword.as_str()))
  }

  fn io_error(&self, source: std::io::Error) -> DocumentError {
    DocumentError::Io {
      path: self.path.clone(),
      source,
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  fn rust() -> Language {
    Language::new([".rs"]).with_line_comment("//").with_block_comment("/*", "*/")
  }

  fn lines(lines: &[&str]) -> Option<Vec<String>> {
    Some(lines.iter().map(|line| line.to_string()).collect())
  }

  fn rewrite(content: &str, header: Option<Vec<String>>, keywords: &[String]) -> Rewrite {
    HeaderDocument::for_content("main.rs", content, &rust(), header, keywords)
      .expect("document")
      .rewrite_content()
      .expect("rewrite")
  }

  #[test]
  fn test_inserts_header_before_code() {
    let result = rewrite("fn main() {}\n", lines(&["// Copyright"]), &[]);
    assert_eq!(result.action, HeaderAction::Inserted);
    assert_eq!(result.content, "// Copyright\nfn main() {}\n");
  }

  #[test]
  fn test_insert_is_idempotent() {
    let header = lines(&["// Copyright", ""]);
    let first = rewrite("fn main() {}\n", header.clone(), &[]);
    let second = rewrite(&first.content, header, &[]);

    assert_eq!(first.content, "// Copyright\n\nfn main() {}\n");
    assert_eq!(second.action, HeaderAction::Unchanged);
    assert_eq!(second.content, first.content);
  }

  #[test]
  fn test_replaces_existing_header() {
    let result = rewrite("// Old\n\nfn main() {}\n", lines(&["// New", ""]), &[]);
    assert_eq!(result.action, HeaderAction::Replaced);
    assert_eq!(result.content, "// New\n\nfn main() {}\n");
  }

  #[test]
  fn test_uses_dominant_line_ending_of_text() {
    let result = rewrite("fn main() {}\r\n", lines(&["// a", "// b"]), &[]);
    assert_eq!(result.content, "// a\r\n// b\r\nfn main() {}\r\n");
  }

  #[test]
  fn test_removes_existing_header() {
    let result = rewrite("// Copyright\n\nfn main() {}", None, &[]);
    assert_eq!(result.action, HeaderAction::Removed);
    assert_eq!(result.content, "fn main() {}");
  }

  #[test]
  fn test_remove_without_header_is_unchanged() {
    let result = rewrite("fn main() {}\n", None, &[]);
    assert_eq!(result.action, HeaderAction::Unchanged);
    assert_eq!(result.content, "fn main() {}\n");
  }

  #[test]
  fn test_keyword_gate_keeps_unrelated_comment() {
    let keywords = vec!["copyright".to_string()];

    let result = rewrite("//test content", None, &keywords);
    assert_eq!(result.action, HeaderAction::Unchanged);
    assert_eq!(result.content, "//test content");

    let result = rewrite("//test content copyright", None, &keywords);
    assert_eq!(result.action, HeaderAction::Removed);
    assert_eq!(result.content, "");
  }

  #[test]
  fn test_keyword_gate_is_case_insensitive() {
    let keywords = vec!["Copyright".to_string()];
    let result = rewrite("// COPYRIGHT 2020\nfn main() {}\n", None, &keywords);
    assert_eq!(result.content, "fn main() {}\n");
  }

  #[test]
  fn test_keyword_gate_inserts_above_unrelated_comment() {
    let keywords = vec!["copyright".to_string()];
    let result = rewrite("// Module docs\nfn main() {}\n", lines(&["// Copyright"]), &keywords);
    assert_eq!(result.action, HeaderAction::Inserted);
    assert_eq!(result.content, "// Copyright\n\n// Module docs\nfn main() {}\n");
  }

  #[test]
  fn test_keyword_gate_does_not_reinsert_header_without_keyword() {
    let keywords = vec!["copyright".to_string()];
    let header = lines(&["// Licensed under MIT", ""]);

    let first = rewrite("fn f() {}\n", header.clone(), &keywords);
    assert_eq!(first.action, HeaderAction::Inserted);
    assert_eq!(first.content, "// Licensed under MIT\n\nfn f() {}\n");

    let second = rewrite(&first.content, header, &keywords);
    assert_eq!(second.action, HeaderAction::Unchanged);
    assert_eq!(second.content, first.content);
  }

  #[test]
  fn test_skip_expression_prefix_is_preserved() {
    let language = rust().with_skip_expression(r"#![^\r\n]*\n");
    let document = HeaderDocument::for_content(
      "main.rs",
      "#!/usr/bin/env run\n// Old\nfn main() {}\n",
      &language,
      lines(&["// New"]),
      &[],
    )
    .expect("document");

    let result = document.rewrite_content().expect("rewrite");
    assert_eq!(result.content, "#!/usr/bin/env run\n// New\nfn main() {}\n");
  }

  #[test]
  fn test_skip_expression_must_match_at_start() {
    let language = rust().with_skip_expression("KEEP\n");
    let document =
      HeaderDocument::for_content("main.rs", "fn a() {}\nKEEP\n", &language, lines(&["// h"]), &[]).expect("document");

    let result = document.rewrite_content().expect("rewrite");
    assert_eq!(result.content, "// h\nfn a() {}\nKEEP\n");
  }

  #[test]
  fn test_malformed_existing_comment_fails() {
    let document = HeaderDocument::for_content(
      "main.rs",
      "/* This is a comment.\nThis is not a comment.",
      &rust(),
      lines(&["// h"]),
      &[],
    )
    .expect("document");

    assert!(matches!(document.rewrite_content(), Err(DocumentError::Parse(_))));
  }

  #[test]
  fn test_validate_header() {
    let valid = HeaderDocument::for_content("main.rs", "", &rust(), lines(&["// a", "/* b */", ""]), &[]).expect("doc");
    assert!(valid.validate_header());

    let invalid = HeaderDocument::for_content("main.rs", "", &rust(), lines(&["// a", "not a comment"]), &[]).expect("doc");
    assert!(!invalid.validate_header());

    let remove = HeaderDocument::for_content("main.rs", "", &rust(), None, &[]).expect("doc");
    assert!(remove.validate_header());

    let unterminated = HeaderDocument::for_content("main.rs", "", &rust(), lines(&["/* open"]), &[]).expect("doc");
    assert!(!unterminated.validate_header());
  }

  #[tokio::test]
  async fn test_content_mode_rejects_file_access() {
    let document = HeaderDocument::for_content("main.rs", "", &rust(), None, &[]).expect("document");

    let result = document.rewrite_file().await;
    assert!(matches!(
      result,
      Err(DocumentError::InvalidOperation {
        mode: AccessMode::Content,
        ..
      })
    ));
  }

  #[tokio::test]
  async fn test_path_mode_rewrites_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("main.rs");
    std::fs::write(&path, "fn main() {}\n").expect("seed file");

    let document = HeaderDocument::for_path(&path, &rust(), lines(&["// Copyright"]), &[]).expect("document");
    assert!(matches!(
      document.rewrite_content(),
      Err(DocumentError::InvalidOperation {
        mode: AccessMode::Path,
        ..
      })
    ));

    let result = document.rewrite_file().await.expect("rewrite");
    assert_eq!(result.action, HeaderAction::Inserted);
    assert_eq!(
      std::fs::read_to_string(&path).expect("read back"),
      "// Copyright\nfn main() {}\n"
    );
  }
}
