//! Separation of a new header from the comment that follows it.
//!
//! When a header is inserted in front of a file that already starts with a
//! comment, the two would read as one block (and be parsed as one header on
//! the next run). The preparer appends a blank line in that case.

use crate::comment_parser::{CommentParser, ParseError};
use crate::line_endings;

/// Returns `header` ready to be inserted in front of `following_text`.
///
/// The header's line endings are normalized to its own dominant style. One
/// more line ending is appended when all of these hold:
///
/// - `following_text` does not already start with a line ending
/// - the header does not already end with a blank line
/// - `following_text` starts with a comment
///
/// # Errors
///
/// Returns an error if the leading comment of `following_text` is malformed.
pub fn prepare(header: &str, following_text: &str, parser: &CommentParser) -> Result<String, ParseError> {
  let ending = line_endings::detect_dominant(header).as_str();
  let mut prepared = line_endings::replace_all(header, ending);

  let blank_line = ending.repeat(2);
  if !following_text.starts_with(ending)
    && !prepared.ends_with(&blank_line)
    && !parser.parse(following_text)?.is_empty()
  {
    prepared.push_str(ending);
  }

  Ok(prepared)
}
