//! # File I/O Module
//!
//! Whole-file reads and writes for path-mode documents.
//!
//! Writes go to a temporary sibling file that is then renamed over the
//! target, so a file is either fully rewritten or left as it was.

use std::path::{Path, PathBuf};

use tracing::trace;

/// Reads the complete file as UTF-8.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub async fn read_full_content(path: &Path) -> std::io::Result<String> {
  tokio::fs::read_to_string(path).await
}

/// Replaces the content of `path` with `content`.
///
/// # Parameters
///
/// * `path` - Path to the file to write
/// * `content` - New content of the file
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed. The
/// temporary file is removed on failure.
pub async fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
  let temp_path = temp_path_for(path);
  trace!("Writing {} via {}", path.display(), temp_path.display());

  if let Err(e) = tokio::fs::write(&temp_path, content).await {
    let _ = tokio::fs::remove_file(&temp_path).await;
    return Err(e);
  }

  if let Ok(metadata) = tokio::fs::metadata(path).await {
    let _ = tokio::fs::set_permissions(&temp_path, metadata.permissions()).await;
  }

  if let Err(e) = tokio::fs::rename(&temp_path, path).await {
    let _ = tokio::fs::remove_file(&temp_path).await;
    return Err(e);
  }

  Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!(".{file_name}.lhm-tmp"))
}
