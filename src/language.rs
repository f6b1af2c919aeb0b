//! # Language Module
//!
//! This module describes the comment grammar of a programming language: which
//! tokens start line comments, which pair delimits block comments, which pair
//! opens and closes regions, and which leading text has to stay above any
//! header (the skip expression).
//!
//! [`Language::defaults`] provides the built-in grammar table; user-defined
//! languages from the configuration file are validated with
//! [`Language::validate`] before they reach the header engine.

use regex::Regex;
use serde::Deserialize;

/// Error type for invalid language definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
  /// The language does not apply to any extension.
  #[error("Language defines no extensions")]
  NoExtensions,

  /// Only one of the region start/end tokens is set.
  #[error("Language {extensions} defines only one of region-start and region-end")]
  IncompleteRegion { extensions: String },

  /// Only one of the block comment start/end tokens is set.
  #[error("Language {extensions} defines only one of block-comment-start and block-comment-end")]
  IncompleteBlockComment { extensions: String },

  /// Neither a line comment nor a block comment pair is set.
  #[error("Language {extensions} defines neither a line comment nor a block comment")]
  NoCommentSyntax { extensions: String },

  /// The skip expression is not a valid regular expression.
  #[error("Invalid skip expression for language {extensions}: {message}")]
  InvalidSkipExpression { extensions: String, message: String },
}

/// The comment grammar of one language.
///
/// Deserializes from the `[[languages]]` tables of the configuration file:
///
/// ```toml
/// [[languages]]
/// extensions = [".cs"]
/// line-comment = "//"
/// block-comment-start = "/*"
/// block-comment-end = "*/"
/// region-start = "#region"
/// region-end = "#endregion"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Language {
  /// File extensions (suffixes) this language applies to, e.g. `.cs`.
  pub extensions: Vec<String>,

  #[serde(default)]
  pub line_comment: Option<String>,

  #[serde(default)]
  pub block_comment_start: Option<String>,

  #[serde(default)]
  pub block_comment_end: Option<String>,

  #[serde(default)]
  pub region_start: Option<String>,

  #[serde(default)]
  pub region_end: Option<String>,

  /// Regular expression matched at the very start of a file. The matched text
  /// is kept above the header.
  #[serde(default)]
  pub skip_expression: Option<String>,
}

impl Language {
  /// Creates a language for the given extensions without any comment syntax.
  ///
  /// Extensions are normalized to lower case with a leading dot. Use the
  /// `with_*` methods to add comment tokens.
  pub fn new<I, S>(extensions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      extensions: extensions.into_iter().map(|ext| normalize_extension(ext.as_ref())).collect(),
      ..Self::default()
    }
  }

  pub fn with_line_comment(mut self, token: &str) -> Self {
    self.line_comment = Some(token.to_string());
    self
  }

  pub fn with_block_comment(mut self, start: &str, end: &str) -> Self {
    self.block_comment_start = Some(start.to_string());
    self.block_comment_end = Some(end.to_string());
    self
  }

  pub fn with_region(mut self, start: &str, end: &str) -> Self {
    self.region_start = Some(start.to_string());
    self.region_end = Some(end.to_string());
    self
  }

  pub fn with_skip_expression(mut self, expression: &str) -> Self {
    self.skip_expression = Some(expression.to_string());
    self
  }

  /// Checks the invariants of a language definition.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  /// - No extension is defined
  /// - Only one half of the region or block comment pair is defined
  /// - Neither a line comment nor a block comment pair is defined
  /// - The skip expression does not compile
  pub fn validate(&self) -> Result<(), LanguageError> {
    if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
      return Err(LanguageError::NoExtensions);
    }

    let extensions = self.extensions.join(" ");

    if self.region_start.is_some() != self.region_end.is_some() {
      return Err(LanguageError::IncompleteRegion { extensions });
    }

    if self.block_comment_start.is_some() != self.block_comment_end.is_some() {
      return Err(LanguageError::IncompleteBlockComment { extensions });
    }

    if self.line_comment.is_none() && self.block_comment_start.is_none() {
      return Err(LanguageError::NoCommentSyntax { extensions });
    }

    self.compile_skip_expression()?;

    Ok(())
  }

  /// Compiles the skip expression, if any.
  pub fn compile_skip_expression(&self) -> Result<Option<Regex>, LanguageError> {
    self
      .skip_expression
      .as_deref()
      .filter(|expression| !expression.is_empty())
      .map(|expression| {
        Regex::new(expression).map_err(|e| LanguageError::InvalidSkipExpression {
          extensions: self.extensions.join(" "),
          message: e.to_string(),
        })
      })
      .transpose()
  }

  /// Returns `true` if one of this language's extensions is a suffix of
  /// `file_name`, ignoring case.
  pub fn matches(&self, file_name: &str) -> bool {
    let file_name = file_name.to_lowercase();
    self
      .extensions
      .iter()
      .filter(|ext| !ext.is_empty())
      .any(|ext| file_name.ends_with(&ext.to_lowercase()))
  }

  /// Returns a copy with all extensions normalized (lower case, leading dot).
  pub fn normalized(&self) -> Self {
    Self {
      extensions: self.extensions.iter().map(|ext| normalize_extension(ext)).collect(),
      ..self.clone()
    }
  }

  /// The built-in language table.
  pub fn defaults() -> Vec<Self> {
    const SHEBANG: &str = r"#![^\r\n]*(\r\n|\n|\r)?";

    vec![
      Self::new([".cs"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
        .with_region("#region", "#endregion"),
      Self::new([".c", ".cpp", ".cxx", ".cc", ".h", ".hpp", ".hxx"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/"),
      Self::new([".vb"])
        .with_line_comment("'")
        .with_region("#Region", "#End Region"),
      Self::new([".fs", ".fsi", ".fsx"])
        .with_line_comment("//")
        .with_block_comment("(*", "*)"),
      Self::new([".java", ".kt", ".kts", ".scala", ".groovy", ".swift", ".dart"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/"),
      Self::new([".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
        .with_skip_expression(r"(///\s*<reference[^\r\n]*/>[ \t]*(\r\n|\n|\r)?)+"),
      Self::new([".css", ".less", ".scss"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/"),
      Self::new([".aspx", ".ascx", ".master"]).with_block_comment("<%--", "--%>"),
      Self::new([".htm", ".html", ".cshtml", ".vbhtml", ".vue", ".svg"]).with_block_comment("<!--", "-->"),
      Self::new([".xml", ".xaml", ".resx", ".config", ".xsd", ".xsl", ".xslt", ".csproj", ".props", ".targets"])
        .with_block_comment("<!--", "-->")
        .with_skip_expression(r"(?s)(<\?xml.*?\?>)?(\s*<!DOCTYPE.*?>)?[ \t]*(\r\n|\n|\r)?"),
      Self::new([".sql"])
        .with_line_comment("--")
        .with_block_comment("/*", "*/"),
      Self::new([".ps1", ".psm1", ".psd1"])
        .with_line_comment("#")
        .with_block_comment("<#", "#>")
        .with_region("#region", "#endregion"),
      Self::new([".py", ".pyi", ".sh", ".bash", ".rb", ".pl", ".yaml", ".yml", ".toml", ".tf", ".r"])
        .with_line_comment("#")
        .with_skip_expression(SHEBANG),
      Self::new([".rs", ".go", ".proto"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/"),
      Self::new([".php"])
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
        .with_skip_expression(r"<\?php[ \t]*(\r\n|\n|\r)?"),
      Self::new([".hs", ".lua"]).with_line_comment("--"),
    ]
  }
}

/// Normalizes an extension to lower case with a leading dot.
///
/// `"CS"`, `".cs"` and `" .Cs "` all become `".cs"`. An empty input stays
/// empty.
pub fn normalize_extension(extension: &str) -> String {
  let trimmed = extension.trim();
  if trimmed.is_empty() {
    return String::new();
  }

  let lower = trimmed.to_lowercase();
  if lower.starts_with('.') { lower } else { format!(".{lower}") }
}

/// Returns the first language in `languages` matching `file_name`.
pub fn find_language<'a>(languages: &'a [Language], file_name: &str) -> Option<&'a Language> {
  languages.iter().find(|language| language.matches(file_name))
}
