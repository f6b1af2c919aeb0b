#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use lhm::header::HeaderDefinitionMap;

/// Header definition used by most tests. Every section ends with a blank line
/// so that inserted headers are separated from the code.
pub const DEFINITION: &str = "extensions: .cs .rs .js
// Copyright Test

extensions: .generated.cs
// Generated code

extensions: .designer.cs
extensions: .py
# Copyright Test

extensions: .vb
' Copyright Test
";

/// Writes `content` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Reads `path` back as a string.
pub fn read_file(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Writes [`DEFINITION`] into `dir` and returns its path.
pub fn write_definition(dir: &Path) -> Result<PathBuf> {
  write_file(dir, "test.licenseheader", DEFINITION)
}

/// Parses a header definition text into a shareable map.
pub fn headers(text: &str) -> Arc<HeaderDefinitionMap> {
  Arc::new(HeaderDefinitionMap::parse(text))
}
