//! # Comment Parser Module
//!
//! This module extracts the leading comment block ("header") of a text given
//! a language's comment grammar.
//!
//! The parser is a position-based scanner over the raw text. It knows nothing
//! about the language beyond its comment and region delimiters, which it treats
//! as opaque strings. The header is the longest prefix consisting only of:
//!
//! - line comments
//! - block comments
//! - region start/end markers, possibly nested
//! - whitespace, with at most one blank line once the header has started
//!
//! Scanning stops at the first token that is none of these.

use crate::language::Language;
use crate::line_endings::{self, is_line_break};

/// Error returned when the leading comment structure of a text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
  /// A block comment is opened but never closed.
  #[error("Unterminated block comment starting at offset {offset}")]
  UnterminatedBlockComment { offset: usize },

  /// A region end marker appears without a matching region start.
  #[error("Region end at offset {offset} has no matching region start")]
  UnmatchedRegionClose { offset: usize },
}

/// Comment and region tokens of one language, as used by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentParser {
  line_comment: Option<String>,
  block_comment_start: Option<String>,
  block_comment_end: Option<String>,
  region_start: Option<String>,
  region_end: Option<String>,
}

impl CommentParser {
  /// Creates a parser from explicit tokens. Empty tokens are treated as
  /// absent.
  pub fn new(
    line_comment: Option<&str>,
    block_comment_start: Option<&str>,
    block_comment_end: Option<&str>,
    region_start: Option<&str>,
    region_end: Option<&str>,
  ) -> Self {
    let token = |t: Option<&str>| t.filter(|t| !t.is_empty()).map(str::to_string);
    Self {
      line_comment: token(line_comment),
      block_comment_start: token(block_comment_start),
      block_comment_end: token(block_comment_end),
      region_start: token(region_start),
      region_end: token(region_end),
    }
  }

  /// Creates a parser for the comment grammar of `language`.
  pub fn for_language(language: &Language) -> Self {
    Self::new(
      language.line_comment.as_deref(),
      language.block_comment_start.as_deref(),
      language.block_comment_end.as_deref(),
      language.region_start.as_deref(),
      language.region_end.as_deref(),
    )
  }

  /// Returns the header at the start of `text`.
  ///
  /// The result is always a prefix of `text`. It is empty when `text` does not
  /// start with a comment, even if it starts with blank lines.
  ///
  /// # Errors
  ///
  /// Returns an error if a block comment in the header is never closed or a
  /// region end marker has no matching region start.
  pub fn parse<'a>(&self, text: &'a str) -> Result<&'a str, ParseError> {
    let end = Scanner::new(self, text).run()?;
    let header = &text[..end];

    if header.trim().is_empty() {
      return Ok("");
    }

    Ok(header)
  }

  /// Returns `true` if `text` consists of nothing but a header.
  ///
  /// Parse errors count as "not a header".
  pub fn is_complete_header(&self, text: &str) -> bool {
    matches!(self.parse(text), Ok(header) if header == text)
  }
}

/// How a whitespace run between two tokens ended.
enum Gap {
  /// Reached the next token.
  Token,
  /// Reached the end of the text.
  EndOfText,
  /// Found a blank line after the header started. The header ends at the
  /// contained offset.
  BlankLine(usize),
}

/// Mutable state of one `parse` call.
struct Scanner<'p, 't> {
  parser: &'p CommentParser,
  text: &'t str,
  position: usize,
  started: bool,
  /// Offsets of the region start markers that are still open, innermost last.
  regions: Vec<usize>,
}

impl<'p, 't> Scanner<'p, 't> {
  const fn new(parser: &'p CommentParser, text: &'t str) -> Self {
    Self {
      parser,
      text,
      position: 0,
      started: false,
      regions: Vec::new(),
    }
  }

  /// Scans the text and returns the byte offset at which the header ends.
  fn run(mut self) -> Result<usize, ParseError> {
    let end = loop {
      match self.skip_whitespace() {
        Gap::EndOfText => break self.text.len(),
        Gap::BlankLine(end) => break end,
        Gap::Token => {}
      }

      let token_start = self.position;
      let token = self.read_token();

      if !self.handle_token(token_start, token)? {
        break self.trim_to_line_start(token_start);
      }
    };

    if !self.started {
      return Ok(0);
    }

    // A region still open when scanning stops cannot belong to the header:
    // cut the header at the outermost open region.
    match self.regions.first() {
      Some(&outermost) => Ok(self.trim_to_line_start(outermost)),
      None => Ok(end),
    }
  }

  /// Consumes one token. Returns `false` if the token is not part of the
  /// header grammar; the position is then left unspecified.
  fn handle_token(&mut self, token_start: usize, token: &'t str) -> Result<bool, ParseError> {
    let parser = self.parser;

    if let Some(line_comment) = parser.line_comment.as_deref()
      && token.starts_with(line_comment)
    {
      self.started = true;
      self.skip_to_line_end();
      return Ok(true);
    }

    if let (Some(start), Some(end)) = (
      parser.block_comment_start.as_deref(),
      parser.block_comment_end.as_deref(),
    ) && token.starts_with(start)
    {
      self.started = true;
      let search_from = token_start + start.len();
      let close = self.text[search_from..]
        .find(end)
        .ok_or(ParseError::UnterminatedBlockComment { offset: token_start })?;
      self.position = search_from + close + end.len();
      return Ok(true);
    }

    if let Some(region_start) = parser.region_start.as_deref()
      && token == region_start
    {
      self.started = true;
      self.regions.push(token_start);
      self.skip_to_line_end();
      return Ok(true);
    }

    if let Some(region_end) = parser.region_end.as_deref() {
      if token == region_end {
        self.close_region(token_start)?;
        return Ok(true);
      }

      // Region end markers written as two words, e.g. "#end region".
      if !token.is_empty() && region_end.starts_with(token) && self.region_end_split_across_whitespace(token) {
        self.close_region(token_start)?;
        return Ok(true);
      }
    }

    Ok(false)
  }

  /// Reads the token following `first` and checks whether both together spell
  /// the region end marker. Leaves the position after the second token.
  fn region_end_split_across_whitespace(&mut self, first: &str) -> bool {
    let Some(region_end) = self.parser.region_end.as_deref() else {
      return false;
    };

    let expected: String = region_end.chars().filter(|c| !c.is_whitespace()).collect();

    // The second word must be on the same line. Otherwise a lone prefix such
    // as `#` at the end of a line would pull the first word of the next line
    // into the marker.
    let rest = &self.text[self.position..];
    let gap = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    self.position += gap;
    let second = self.read_token();

    !second.is_empty() && format!("{first}{second}") == expected
  }

  fn close_region(&mut self, token_start: usize) -> Result<(), ParseError> {
    self.started = true;
    if self.regions.pop().is_none() {
      return Err(ParseError::UnmatchedRegionClose { offset: token_start });
    }
    self.skip_to_line_end();
    Ok(())
  }

  /// Skips whitespace up to the next token.
  ///
  /// Once the header has started and no region is open, a whitespace run with
  /// two or more line breaks (a blank line) ends the header. The header then
  /// keeps the line break that terminates its last line plus one blank line.
  fn skip_whitespace(&mut self) -> Gap {
    let check_blank_lines = self.started && self.regions.is_empty();
    let mut line_breaks = 0;

    while let Some(c) = self.text[self.position..].chars().next() {
      if !c.is_whitespace() {
        return Gap::Token;
      }

      if is_line_break(c) {
        let found = line_endings::next_line_end_info(self.text, self.position, None);
        let next = found.map_or(self.position + 1, |found| found.end());
        line_breaks += 1;
        self.position = next;

        if check_blank_lines && line_breaks >= 2 {
          return Gap::BlankLine(next);
        }
      } else {
        self.position += c.len_utf8();
      }
    }

    Gap::EndOfText
  }

  /// Reads the whitespace-delimited token at the current position.
  fn read_token(&mut self) -> &'t str {
    let text = self.text;
    let rest = &text[self.position..];
    let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    self.position += len;
    &rest[..len]
  }

  /// Moves the position to the end of the current line, before its line break.
  fn skip_to_line_end(&mut self) {
    self.position = line_endings::next_line_end(self.text, self.position, None).unwrap_or(self.text.len());
  }

  /// Moves `offset` back over spaces and tabs so that indentation in front of
  /// the first non-header token stays with that token.
  fn trim_to_line_start(&self, offset: usize) -> usize {
    let before = &self.text[..offset];
    let trimmed = before.trim_end_matches(|c: char| c.is_whitespace() && !is_line_break(c));
    trimmed.len()
  }
}
