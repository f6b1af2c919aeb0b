//! Collection of the files named on the command line.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::header::is_definition_file;
use crate::replacer::Replacer;
use crate::verbose_log;

/// Expands `paths` into a sorted, duplicate-free list of files.
///
/// Directories are walked recursively, skipping hidden directories such as
/// `.git`. Files found that way are only kept if a language is configured for
/// them and they are not header definition files. Paths named explicitly are
/// always kept, so that problems with them are reported.
pub fn collect_files(paths: &[PathBuf], replacer: &Replacer) -> Vec<PathBuf> {
  let mut files = BTreeSet::new();

  for path in paths {
    if !path.is_dir() {
      files.insert(path.clone());
      continue;
    }

    debug!("Scanning directory: {}", path.display());
    let start_time = Instant::now();
    let before = files.len();

    let walker = WalkDir::new(path)
      .follow_links(false)
      .into_iter()
      .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          verbose_log!("Skipping unreadable entry: {}", e);
          continue;
        }
      };

      if !entry.file_type().is_file() || !is_candidate(entry.path(), replacer) {
        continue;
      }
      files.insert(entry.into_path());
    }

    debug!(
      "Found {} files in {} ({}ms)",
      files.len() - before,
      path.display(),
      start_time.elapsed().as_millis()
    );
  }

  files.into_iter().collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_candidate(path: &Path, replacer: &Replacer) -> bool {
  if is_definition_file(path) {
    return false;
  }

  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| replacer.language_for_extension(name).is_some())
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;
  use crate::language::Language;

  #[test]
  fn test_collect_files_filters_directory_entries() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    std::fs::create_dir_all(root.join("src/nested")).expect("create dirs");
    std::fs::create_dir_all(root.join(".git")).expect("create .git");
    std::fs::write(root.join("src/main.rs"), "").expect("write");
    std::fs::write(root.join("src/nested/lib.cs"), "").expect("write");
    std::fs::write(root.join("src/data.bin"), "").expect("write");
    std::fs::write(root.join("src/.licenseheader"), "").expect("write");
    std::fs::write(root.join(".git/config.toml"), "").expect("write");

    let replacer = Replacer::new(Language::defaults(), Vec::new());
    let files = collect_files(&[root.to_path_buf()], &replacer);

    assert_eq!(files, vec![root.join("src/main.rs"), root.join("src/nested/lib.cs")]);
  }

  #[test]
  fn test_explicit_files_are_kept() {
    let replacer = Replacer::new(Language::defaults(), Vec::new());
    let files = collect_files(
      &[PathBuf::from("missing.unknown"), PathBuf::from("missing.unknown")],
      &replacer,
    );

    assert_eq!(files, vec![PathBuf::from("missing.unknown")]);
  }
}
