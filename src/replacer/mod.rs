//! # Replacer Module
//!
//! The replacer resolves, for each input file, the language and the header to
//! use, builds a [`HeaderDocument`] and applies it. It offers single-file
//! operations and concurrent batch operations for both access modes.
//!
//! Batches run one task per file on the tokio runtime. An admission gate bounds
//! the number of files in flight (default [`DEFAULT_MAX_PARALLELISM`]). Each
//! completed file produces a [`ReplacerProgress`] event on the optional
//! progress channel. Cancellation is cooperative: it is checked before a file
//! is admitted, before its header is validated and before it is written.

mod gate;
mod input;
mod progress;
mod result;

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use self::gate::AdmissionGate;
pub use self::input::{ContentInput, PathInput, ReplacerInput};
use self::progress::ProgressReporter;
pub use self::progress::{ProgressSender, ReplacerProgress};
pub use self::result::{
  BatchReport, Cancelled, ContentBatch, CreateDocumentError, ReplacerError, ReplacerErrorKind, ReplacerResult,
  ReplacerSuccess,
};
use crate::header::{HeaderDocument, PropertyExpander, is_definition_file};
use crate::language::{Language, find_language};

/// Number of files processed at once unless configured otherwise.
pub const DEFAULT_MAX_PARALLELISM: usize = 15;

/// Inserts, replaces and removes headers. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Replacer {
  languages: Arc<[Language]>,
  keywords: Arc<[String]>,
  max_parallelism: usize,
}

impl Replacer {
  /// Creates a replacer for `languages`.
  ///
  /// # Parameters
  ///
  /// * `languages` - Language definitions, consulted in order
  /// * `keywords` - Existing headers are only replaced or removed if they
  ///   contain one of these (case-insensitive). Empty disables the check.
  pub fn new(languages: Vec<Language>, keywords: Vec<String>) -> Self {
    Self {
      languages: languages.iter().map(Language::normalized).collect(),
      keywords: keywords.into(),
      max_parallelism: DEFAULT_MAX_PARALLELISM,
    }
  }

  /// Sets the maximum number of files processed at once. Values below one are
  /// raised to one.
  pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
    self.max_parallelism = max_parallelism.max(1);
    self
  }

  pub const fn max_parallelism(&self) -> usize {
    self.max_parallelism
  }

  pub fn languages(&self) -> &[Language] {
    &self.languages
  }

  /// Returns the first language with an extension that is a case-insensitive
  /// suffix of `extension` (a bare extension or a whole file name).
  pub fn language_for_extension(&self, extension: &str) -> Option<&Language> {
    if extension.is_empty() {
      return None;
    }
    find_language(&self.languages, extension)
  }

  /// Returns `true` if the file exists and a document can be created for it.
  pub fn is_valid_path_input(&self, input: &PathInput) -> bool {
    input.path.exists() && self.try_create_document(input).is_ok()
  }

  /// Builds the document for `input`.
  ///
  /// Header tokens are expanded with the input's additional properties and the
  /// built-in properties.
  ///
  /// # Errors
  ///
  /// Returns an error if, in this order:
  /// - A path-mode input does not exist
  /// - The input is a header definition file
  /// - No language matches the file name
  /// - The matching language is invalid
  /// - Header definitions were given but none matches the file name
  /// - The matching header consists of blank lines only
  pub fn try_create_document<I: ReplacerInput>(&self, input: &I) -> Result<HeaderDocument, CreateDocumentError> {
    let path = input.path();

    if input.content().is_none() && !path.is_file() {
      return Err(CreateDocumentError::FileNotFound {
        path: path.to_path_buf(),
      });
    }

    if is_definition_file(path) {
      return Err(CreateDocumentError::LicenseHeaderDocument {
        path: path.to_path_buf(),
      });
    }

    let file_name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    let extension = display_extension(&file_name);

    let language = self
      .language_for_extension(&file_name)
      .ok_or_else(|| CreateDocumentError::LanguageNotFound {
        path: path.to_path_buf(),
        extension: extension.clone(),
      })?;

    language.validate().map_err(|source| CreateDocumentError::InvalidLanguage {
      path: path.to_path_buf(),
      source,
    })?;

    let header_lines = match input.headers() {
      None => None,
      Some(headers) => {
        let (key, lines) = headers
          .lookup(&file_name)
          .ok_or_else(|| CreateDocumentError::NoHeaderFound {
            path: path.to_path_buf(),
            extension: extension.clone(),
          })?;

        if lines.iter().all(|line| line.trim().is_empty()) {
          return Err(CreateDocumentError::EmptyHeader {
            path: path.to_path_buf(),
            extension: key.to_string(),
          });
        }

        trace!("Using header {} for {}", key, path.display());
        Some(PropertyExpander::new(path, input.properties()).expand(lines))
      }
    };

    let document = match input.content() {
      Some(content) => HeaderDocument::for_content(path, content, language, header_lines, &self.keywords),
      None => HeaderDocument::for_path(path, language, header_lines, &self.keywords),
    };

    document.map_err(|source| CreateDocumentError::InvalidLanguage {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Inserts, replaces or removes the header of one file on disk.
  ///
  /// # Errors
  ///
  /// Returns a [`ReplacerError`] whose kind tells why the file was not
  /// processed. The file is unchanged in that case.
  pub async fn remove_or_replace_header(&self, input: &PathInput) -> ReplacerResult {
    let document = self
      .try_create_document(input)
      .map_err(|e| e.into_replacer_error(None))?;
    self
      .apply_to_file(input, &document, &CancellationToken::new())
      .await
      .unwrap_or_else(|cancelled| Err(cancelled_error(&input.path, None, cancelled)))
  }

  /// Inserts, replaces or removes the header of in-memory content.
  ///
  /// # Errors
  ///
  /// Returns a [`ReplacerError`] whose kind tells why the content was not
  /// processed.
  pub fn remove_or_replace_header_content(&self, input: &ContentInput) -> ReplacerResult {
    let document = self
      .try_create_document(input)
      .map_err(|e| e.into_replacer_error(Some(&input.content)))?;
    self
      .apply_to_content(input, &document, &CancellationToken::new())
      .unwrap_or_else(|cancelled| Err(cancelled_error(&input.path, Some(&input.content), cancelled)))
  }

  /// Processes in-memory contents concurrently.
  ///
  /// Inputs for which no document can be created (e.g. unknown language) are
  /// left out of the results; all other inputs yield exactly one entry. The
  /// order of the entries is unspecified.
  ///
  /// # Errors
  ///
  /// Returns [`Cancelled`] if `cancel` fired before all inputs were processed.
  pub async fn remove_or_replace_headers_content(
    &self,
    inputs: Vec<ContentInput>,
    progress: Option<ProgressSender>,
    cancel: &CancellationToken,
  ) -> Result<ContentBatch, Cancelled> {
    let reporter = Arc::new(ProgressReporter::new(inputs.len(), progress));
    let gate = AdmissionGate::new(self.max_parallelism);
    debug!(
      "Processing {} content input(s), at most {} at once",
      inputs.len(),
      self.max_parallelism
    );

    let mut tasks = JoinSet::new();
    for input in inputs {
      let replacer = self.clone();
      let reporter = Arc::clone(&reporter);
      let gate = gate.clone();
      let cancel = cancel.clone();
      tasks.spawn(async move { replacer.content_task(input, &reporter, &gate, &cancel).await });
    }

    let mut results = Vec::new();
    let mut cancelled = false;
    while let Some(joined) = tasks.join_next().await {
      match resume_panic(joined) {
        Some(Ok(Some(result))) => results.push(result),
        Some(Ok(None)) | None => {}
        Some(Err(Cancelled)) => cancelled = true,
      }
    }

    debug!(
      "Content batch finished: {} processed, peak parallelism {}",
      reporter.processed().await,
      gate.peak()
    );

    if cancelled || cancel.is_cancelled() {
      return Err(Cancelled);
    }
    Ok(ContentBatch {
      results,
      peak_parallelism: gate.peak(),
    })
  }

  /// Processes files on disk concurrently, rewriting them in place.
  ///
  /// Every failure, including inputs for which no document can be created, is
  /// collected in the returned report.
  ///
  /// # Errors
  ///
  /// Returns [`Cancelled`] if `cancel` fired before all inputs were processed.
  /// Files already rewritten keep their new content.
  pub async fn remove_or_replace_headers(
    &self,
    inputs: Vec<PathInput>,
    progress: Option<ProgressSender>,
    cancel: &CancellationToken,
  ) -> Result<BatchReport, Cancelled> {
    let reporter = Arc::new(ProgressReporter::new(inputs.len(), progress));
    let gate = AdmissionGate::new(self.max_parallelism);
    debug!(
      "Processing {} file(s), at most {} at once",
      inputs.len(),
      self.max_parallelism
    );

    let mut tasks = JoinSet::new();
    for input in inputs {
      let replacer = self.clone();
      let reporter = Arc::clone(&reporter);
      let gate = gate.clone();
      let cancel = cancel.clone();
      tasks.spawn(async move { replacer.path_task(input, &reporter, &gate, &cancel).await });
    }

    let mut report = BatchReport::default();
    let mut cancelled = false;
    while let Some(joined) = tasks.join_next().await {
      match resume_panic(joined) {
        Some(Ok(Ok(success))) => {
          report.processed += 1;
          if success.action.is_change() {
            report.changed.push((success.path, success.action));
          }
        }
        Some(Ok(Err(error))) => {
          report.processed += 1;
          report.errors.push(error);
        }
        Some(Err(Cancelled)) => cancelled = true,
        None => {}
      }
    }

    debug!(
      "Batch finished: {} processed, {} changed, {} error(s), peak parallelism {}",
      report.processed,
      report.changed.len(),
      report.errors.len(),
      gate.peak()
    );

    if cancelled || cancel.is_cancelled() {
      return Err(Cancelled);
    }
    report.peak_parallelism = gate.peak();
    Ok(report)
  }

  async fn content_task(
    &self,
    input: ContentInput,
    reporter: &ProgressReporter,
    gate: &AdmissionGate,
    cancel: &CancellationToken,
  ) -> Result<Option<ReplacerResult>, Cancelled> {
    let _admission = gate.enter(cancel).await.ok_or(Cancelled)?;

    let document = match self.try_create_document(&input) {
      Ok(document) => document,
      Err(e) => {
        debug!("Skipping {}: {}", input.path.display(), e);
        reporter.report(input.path.clone(), None).await;
        return Ok(None);
      }
    };

    let result = self.apply_to_content(&input, &document, cancel)?;
    let content = result.as_ref().ok().map(|success| success.content.clone());
    reporter.report(input.path.clone(), content).await;
    Ok(Some(result))
  }

  async fn path_task(
    &self,
    input: PathInput,
    reporter: &ProgressReporter,
    gate: &AdmissionGate,
    cancel: &CancellationToken,
  ) -> Result<ReplacerResult, Cancelled> {
    let _admission = gate.enter(cancel).await.ok_or(Cancelled)?;

    let result = match self.try_create_document(&input) {
      Ok(document) => self.apply_to_file(&input, &document, cancel).await?,
      Err(e) => Err(e.into_replacer_error(None)),
    };

    reporter.report(input.path.clone(), None).await;
    Ok(result)
  }

  /// Checks that the desired header is a valid comment, unless the input
  /// overrides the check.
  fn check_header<I: ReplacerInput>(&self, input: &I, document: &HeaderDocument) -> ReplacerResult<()> {
    if input.ignore_non_comment_text() || document.validate_header() {
      return Ok(());
    }

    let path = input.path();
    Err(ReplacerError::new(
      path,
      input.content(),
      ReplacerErrorKind::NonCommentText,
      format!(
        "The header for {} contains text that is not a comment in this language",
        path.display()
      ),
    ))
  }

  fn apply_to_content(
    &self,
    input: &ContentInput,
    document: &HeaderDocument,
    cancel: &CancellationToken,
  ) -> Result<ReplacerResult, Cancelled> {
    check_cancelled(cancel)?;
    if let Err(e) = self.check_header(input, document) {
      return Ok(Err(e));
    }

    check_cancelled(cancel)?;
    let result = document
      .rewrite_content()
      .map(|rewrite| ReplacerSuccess {
        path: input.path.clone(),
        content: rewrite.content,
        action: rewrite.action,
      })
      .map_err(|e| ReplacerError::from_document(&input.path, Some(&input.content), &e));
    Ok(result)
  }

  async fn apply_to_file(
    &self,
    input: &PathInput,
    document: &HeaderDocument,
    cancel: &CancellationToken,
  ) -> Result<ReplacerResult, Cancelled> {
    check_cancelled(cancel)?;
    if let Err(e) = self.check_header(input, document) {
      return Ok(Err(e));
    }

    let to_error = |e| ReplacerError::from_document(&input.path, None, &e);

    let text = match document.load().await {
      Ok(text) => text,
      Err(e) => return Ok(Err(to_error(e))),
    };
    let rewrite = match document.rewrite_text(&text) {
      Ok(rewrite) => rewrite,
      Err(e) => return Ok(Err(to_error(e.into()))),
    };

    check_cancelled(cancel)?;
    if let Err(e) = document.store(&rewrite).await {
      return Ok(Err(to_error(e)));
    }

    Ok(Ok(ReplacerSuccess {
      path: input.path.clone(),
      content: rewrite.content,
      action: rewrite.action,
    }))
  }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), Cancelled> {
  if cancel.is_cancelled() { Err(Cancelled) } else { Ok(()) }
}

fn cancelled_error(path: &Path, content: Option<&str>, cancelled: Cancelled) -> ReplacerError {
  ReplacerError::new(path, content, ReplacerErrorKind::Miscellaneous, cancelled.to_string())
}

/// Re-raises a worker panic on the caller's task.
fn resume_panic<T>(joined: Result<T, tokio::task::JoinError>) -> Option<T> {
  match joined {
    Ok(value) => Some(value),
    Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
    Err(_) => None,
  }
}

/// Extension used in messages: everything from the first dot of the file
/// name, or the whole name if it has none.
fn display_extension(file_name: &str) -> String {
  file_name
    .find('.')
    .map_or_else(|| file_name.to_string(), |dot| file_name[dot..].to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::header::HeaderDefinitionMap;

  fn replacer() -> Replacer {
    Replacer::new(Language::defaults(), Vec::new())
  }

  fn headers(extension: &str, lines: &[&str]) -> Option<Arc<HeaderDefinitionMap>> {
    let mut map = HeaderDefinitionMap::new();
    map.insert(extension, lines.iter().copied());
    Some(Arc::new(map))
  }

  #[test]
  fn test_language_for_extension() {
    let replacer = replacer();
    assert!(replacer.language_for_extension(".CS").is_some());
    assert!(replacer.language_for_extension("form.designer.cs").is_some());
    assert!(replacer.language_for_extension(".unknown").is_none());
    assert!(replacer.language_for_extension("").is_none());

    let empty = Replacer::new(Vec::new(), Vec::new());
    assert!(empty.language_for_extension(".cs").is_none());
  }

  #[test]
  fn test_create_document_error_order() {
    let replacer = replacer();

    let input = PathInput::new("/definitely/missing/file.cs", None);
    assert!(matches!(
      replacer.try_create_document(&input),
      Err(CreateDocumentError::FileNotFound { .. })
    ));

    let input = ContentInput::new("x.licenseheader", "", None);
    assert!(matches!(
      replacer.try_create_document(&input),
      Err(CreateDocumentError::LicenseHeaderDocument { .. })
    ));

    let input = ContentInput::new("x.unknown", "", None);
    assert!(matches!(
      replacer.try_create_document(&input),
      Err(CreateDocumentError::LanguageNotFound { .. })
    ));

    let input = ContentInput::new("x.cs", "", headers(".rs", &["// h"]));
    assert!(matches!(
      replacer.try_create_document(&input),
      Err(CreateDocumentError::NoHeaderFound { .. })
    ));

    let input = ContentInput::new("x.cs", "", headers(".cs", &["", "  "]));
    let error = replacer.try_create_document(&input).expect_err("empty header");
    assert_eq!(error.kind(), ReplacerErrorKind::EmptyHeader);
  }

  #[test]
  fn test_invalid_language_is_miscellaneous() {
    let mut broken = Language::new([".x"]).with_line_comment("//");
    broken.region_start = Some("#region".to_string());
    let replacer = Replacer::new(vec![broken], Vec::new());

    let error = replacer
      .remove_or_replace_header_content(&ContentInput::new("a.x", "", None))
      .expect_err("invalid language");
    assert_eq!(error.kind, ReplacerErrorKind::Miscellaneous);
    assert!(error.message.contains("a.x"));
  }

  #[test]
  fn test_non_comment_header_is_rejected_unless_ignored() {
    let replacer = replacer();
    let input = ContentInput::new("a.cs", "class A {}", headers(".cs", &["Copyright"]));

    let error = replacer.remove_or_replace_header_content(&input).expect_err("not a comment");
    assert_eq!(error.kind, ReplacerErrorKind::NonCommentText);
    assert_eq!(error.content.as_deref(), Some("class A {}"));

    let success = replacer
      .remove_or_replace_header_content(&input.with_ignore_non_comment_text(true))
      .expect("forced insert");
    assert_eq!(success.content, "Copyright\nclass A {}");
  }

  #[test]
  fn test_malformed_existing_header_is_parsing_error() {
    let input = ContentInput::new("a.cs", "/* open\nclass A {}", headers(".cs", &["// h"]));
    let error = replacer().remove_or_replace_header_content(&input).expect_err("parse error");
    assert_eq!(error.kind, ReplacerErrorKind::ParsingError);
  }

  #[test]
  fn test_header_properties_are_expanded() {
    let input = ContentInput::new("dir/a.cs", "class A {}\n", headers(".cs", &["// %FileName% %Owner%"]))
      .with_properties(vec![crate::header::AdditionalProperty::new("%Owner%", "Example")]);

    let success = replacer().remove_or_replace_header_content(&input).expect("insert");
    assert_eq!(success.content, "// a.cs Example\nclass A {}\n");
  }

  #[test]
  fn test_display_extension() {
    assert_eq!(display_extension("form.designer.cs"), ".designer.cs");
    assert_eq!(display_extension("Makefile"), "Makefile");
  }
}
