use std::process::Command;

fn main() {
  embed_long_version();
  set_rerun_conditions();
}

/// Emits `LHM_LONG_VERSION`, the package version followed by the git commit
/// and its date when they are available.
fn embed_long_version() {
  let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
  let hash = git_output(&["rev-parse", "--short", "HEAD"]);
  let date = git_output(&["log", "-1", "--format=%cs"]);

  let long_version = match (hash, date) {
    (Some(hash), Some(date)) => format!("{version} ({hash} {date})"),
    (Some(hash), None) => format!("{version} ({hash})"),
    _ => version,
  };
  println!("cargo:rustc-env=LHM_LONG_VERSION={long_version}");
}

fn git_output(args: &[&str]) -> Option<String> {
  let output = Command::new("git").args(args).output().ok()?;
  if !output.status.success() {
    return None;
  }
  let text = String::from_utf8(output.stdout).ok()?.trim().to_string();
  (!text.is_empty()).then_some(text)
}

fn set_rerun_conditions() {
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-changed=.git/HEAD");
}
