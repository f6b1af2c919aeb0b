mod common;

use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use common::{read_file, write_definition, write_file};
use predicates::prelude::*;
use tempfile::tempdir;

fn lhm(dir: &Path) -> Result<Command> {
  let mut command = Command::cargo_bin("lhm")?;
  command.current_dir(dir).env_remove("LHM_CONFIG").env_remove("RUST_LOG").arg("--colors=never");
  Ok(command)
}

#[test]
fn test_dry_run_reports_and_fails_when_files_would_change() -> Result<()> {
  let temp_dir = tempdir()?;
  write_definition(temp_dir.path())?;
  let file = write_file(temp_dir.path(), "src/main.rs", "fn main() {}\n")?;

  lhm(temp_dir.path())?
    .args(["--definition", "test.licenseheader", "src"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("Would insert header in 1 file"))
    .stdout(predicate::str::contains("Run with --modify"));

  assert_eq!(read_file(&file)?, "fn main() {}\n");
  Ok(())
}

#[test]
fn test_modify_writes_headers_and_is_stable() -> Result<()> {
  let temp_dir = tempdir()?;
  write_definition(temp_dir.path())?;
  let rust = write_file(temp_dir.path(), "src/main.rs", "fn main() {}\n")?;
  let python = write_file(temp_dir.path(), "src/tool.py", "#!/usr/bin/env python3\nprint(1)\n")?;

  lhm(temp_dir.path())?
    .args(["--modify", "-d", "test.licenseheader", "src"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Inserted header in 2 files"));

  assert_eq!(read_file(&rust)?, "// Copyright Test\n\nfn main() {}\n");
  assert_eq!(read_file(&python)?, "#!/usr/bin/env python3\n# Copyright Test\n\nprint(1)\n");

  // Nothing left to do, so a dry run succeeds now.
  lhm(temp_dir.path())?
    .args(["-d", "test.licenseheader", "src"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2 unchanged"));

  Ok(())
}

#[test]
fn test_remove_strips_headers() -> Result<()> {
  let temp_dir = tempdir()?;
  let file = write_file(temp_dir.path(), "a.cs", "// Copyright Test\n\nclass A {}\n")?;

  lhm(temp_dir.path())?
    .args(["--remove", "--modify", "a.cs"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed header from 1 file"));

  assert_eq!(read_file(&file)?, "class A {}\n");
  Ok(())
}

#[test]
fn test_remove_respects_keywords() -> Result<()> {
  let temp_dir = tempdir()?;
  let file = write_file(temp_dir.path(), "a.cs", "// Helper types\nclass A {}\n")?;

  lhm(temp_dir.path())?
    .args(["--remove", "--modify", "-k", "copyright", "a.cs"])
    .assert()
    .success();

  assert_eq!(read_file(&file)?, "// Helper types\nclass A {}\n");
  Ok(())
}

#[test]
fn test_show_diff_prints_changes() -> Result<()> {
  let temp_dir = tempdir()?;
  write_definition(temp_dir.path())?;
  write_file(temp_dir.path(), "main.rs", "fn main() {}\n")?;

  lhm(temp_dir.path())?
    .args(["--show-diff", "-d", "test.licenseheader", "main.rs"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Diff for main.rs:"))
    .stderr(predicate::str::contains("+// Copyright Test"));

  Ok(())
}

#[test]
fn test_save_diff_writes_file() -> Result<()> {
  let temp_dir = tempdir()?;
  write_definition(temp_dir.path())?;
  write_file(temp_dir.path(), "a.rs", "fn a() {}\n")?;
  write_file(temp_dir.path(), "b.rs", "fn b() {}\n")?;

  lhm(temp_dir.path())?
    .args(["-o", "changes.diff", "-d", "test.licenseheader", "a.rs", "b.rs"])
    .assert()
    .code(1);

  let diff = read_file(&temp_dir.path().join("changes.diff"))?;
  assert!(diff.contains("Diff for a.rs:"));
  assert!(diff.contains("Diff for b.rs:"));
  Ok(())
}

#[test]
fn test_missing_definition_file_is_an_error() -> Result<()> {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), "main.rs", "fn main() {}\n")?;

  lhm(temp_dir.path())?
    .args(["-d", "missing.licenseheader", "main.rs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to read header definition file"));

  Ok(())
}

#[test]
fn test_definition_is_required_without_remove() -> Result<()> {
  let temp_dir = tempdir()?;

  lhm(temp_dir.path())?
    .arg("main.rs")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("--definition"));

  Ok(())
}

#[test]
fn test_unknown_file_is_reported() -> Result<()> {
  let temp_dir = tempdir()?;
  write_definition(temp_dir.path())?;
  write_file(temp_dir.path(), "notes.unknown", "text\n")?;

  lhm(temp_dir.path())?
    .args(["--modify", "-d", "test.licenseheader", "notes.unknown"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("[language not found]"));

  Ok(())
}

#[test]
fn test_definition_files_are_skipped() -> Result<()> {
  let temp_dir = tempdir()?;
  let definition = write_definition(temp_dir.path())?;

  lhm(temp_dir.path())?
    .args(["--modify", "-d", "test.licenseheader", "test.licenseheader"])
    .assert()
    .success()
    .stdout(predicate::str::contains("1 skipped"));

  assert_eq!(read_file(&definition)?, common::DEFINITION);
  Ok(())
}

#[test]
fn test_config_languages_and_no_config() -> Result<()> {
  let temp_dir = tempdir()?;
  write_file(
    temp_dir.path(),
    "header.licenseheader",
    "extensions: .foo\n;; Copyright Test\n",
  )?;
  write_file(
    temp_dir.path(),
    ".lhm.toml",
    "[[languages]]\nextensions = [\".foo\"]\nline-comment = \";;\"\n",
  )?;
  let file = write_file(temp_dir.path(), "a.foo", "(code)\n")?;

  // Without the config file the extension is unknown.
  lhm(temp_dir.path())?
    .args(["--no-config", "--modify", "-d", "header.licenseheader", "a.foo"])
    .assert()
    .code(1);
  assert_eq!(read_file(&file)?, "(code)\n");

  lhm(temp_dir.path())?
    .args(["--modify", "-d", "header.licenseheader", "a.foo"])
    .assert()
    .success();
  assert_eq!(read_file(&file)?, ";; Copyright Test\n\n(code)\n");

  Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
  let temp_dir = tempdir()?;
  write_file(temp_dir.path(), ".lhm.toml", "max-parallelism = \"many\"\n")?;
  write_file(temp_dir.path(), "a.cs", "class A {}\n")?;

  lhm(temp_dir.path())?
    .args(["--remove", "a.cs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to parse config file"));

  Ok(())
}

#[test]
fn test_properties_are_expanded() -> Result<()> {
  let temp_dir = tempdir()?;
  write_file(
    temp_dir.path(),
    "owner.licenseheader",
    "extensions: .rs\n// %FileName% is owned by %Owner%\n",
  )?;
  let file = write_file(temp_dir.path(), "lib.rs", "pub fn f() {}\n")?;

  lhm(temp_dir.path())?
    .args(["--modify", "-d", "owner.licenseheader", "-p", "Owner=Example Corp", "lib.rs"])
    .assert()
    .success();

  assert_eq!(read_file(&file)?, "// lib.rs is owned by Example Corp\n\npub fn f() {}\n");
  Ok(())
}
