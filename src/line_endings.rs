//! # Line Endings Module
//!
//! Detection, lookup and rewriting of line endings in raw text.
//!
//! Files edited by the header engine may use `\r\n`, `\n` or `\r`, sometimes
//! mixed. Every function here treats a `\r\n` pair as a single line ending and
//! never as a lone `\r` followed by a lone `\n`.

/// A line ending style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
  /// Windows: `\r\n`
  CrLf,
  /// Unix: `\n`
  Lf,
  /// Classic Mac: `\r`
  Cr,
}

impl LineEnding {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::CrLf => "\r\n",
      Self::Lf => "\n",
      Self::Cr => "\r",
    }
  }

  /// The line ending used when a text contains none at all.
  pub const fn platform_default() -> Self {
    if cfg!(windows) { Self::CrLf } else { Self::Lf }
  }
}

impl std::fmt::Display for LineEnding {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::CrLf => write!(f, "CRLF"),
      Self::Lf => write!(f, "LF"),
      Self::Cr => write!(f, "CR"),
    }
  }
}

/// A line ending found by [`next_line_end_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEndMatch {
  /// Byte offset of the first character of the line ending.
  pub index: usize,
  /// The style that matched at `index`.
  pub ending: LineEnding,
}

impl LineEndMatch {
  /// Byte offset just past the line ending.
  pub const fn end(&self) -> usize {
    self.index + self.ending.as_str().len()
  }
}

/// Determines the most frequently used line ending in `text`.
///
/// `\r\n` pairs are counted first and removed before the lone `\r` and `\n`
/// characters are counted, so a pair is never counted three times. On a tie
/// the longer ending wins (`\r\n` over `\n` over `\r`). A text without any
/// line ending yields [`LineEnding::platform_default`].
pub fn detect_dominant(text: &str) -> LineEnding {
  let crlf = text.matches("\r\n").count();
  let total_cr = text.bytes().filter(|&b| b == b'\r').count();
  let total_lf = text.bytes().filter(|&b| b == b'\n').count();

  let counts = [
    (LineEnding::CrLf, crlf),
    (LineEnding::Lf, total_lf - crlf),
    (LineEnding::Cr, total_cr - crlf),
  ];

  if counts.iter().all(|(_, count)| *count == 0) {
    return LineEnding::platform_default();
  }

  // `max_by_key` keeps the last maximum, so iterate shortest first to let the
  // longer ending win ties.
  counts
    .iter()
    .rev()
    .max_by_key(|(_, count)| *count)
    .map_or(LineEnding::platform_default(), |(ending, _)| *ending)
}

/// Rewrites every line ending in `text` to `new_ending`.
///
/// `new_ending` may be any string, including the empty string, in which case
/// all lines are concatenated.
pub fn replace_all(text: &str, new_ending: &str) -> String {
  let canonical = text.replace("\r\n", "\n").replace('\r', "\n");
  if new_ending == "\n" {
    canonical
  } else {
    canonical.replace('\n', new_ending)
  }
}

/// Returns the byte offset of the nearest line ending at or after `start`.
///
/// Only the first `count` bytes after `start` are searched (the rest of the
/// text when `None`). Returns `None` when no line ending lies in range.
pub fn next_line_end(text: &str, start: usize, count: Option<usize>) -> Option<usize> {
  next_line_end_info(text, start, count).map(|found| found.index)
}

/// Like [`next_line_end`], but also reports which line ending matched.
///
/// When `\r\n` starts at the nearest offset it is preferred over a lone `\r`.
/// A `\r\n` pair cut in half by the search window is reported as `\r`.
pub fn next_line_end_info(text: &str, start: usize, count: Option<usize>) -> Option<LineEndMatch> {
  if start >= text.len() {
    return None;
  }

  let end = count.map_or(text.len(), |count| start.saturating_add(count).min(text.len()));
  let window = &text.as_bytes()[start..end];

  let offset = window.iter().position(|&b| b == b'\r' || b == b'\n')?;
  let ending = match (window[offset], window.get(offset + 1)) {
    (b'\r', Some(b'\n')) => LineEnding::CrLf,
    (b'\r', _) => LineEnding::Cr,
    _ => LineEnding::Lf,
  };

  Some(LineEndMatch {
    index: start + offset,
    ending,
  })
}

/// Returns `true` if `c` starts or is part of a line ending.
pub const fn is_line_break(c: char) -> bool {
  c == '\r' || c == '\n'
}
