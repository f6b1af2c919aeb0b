//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod files;
mod run;

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{ArgAction, Parser};
pub use run::run;

use crate::logging::ColorMode;

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(
  author,
  version,
  long_version = env!("LHM_LONG_VERSION"),
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Show which files would get a new header
  lhm --definition project.licenseheader src/

  # Insert or replace headers in place
  lhm --modify --definition project.licenseheader src/ tests/

  # Show the diff of potential changes without modifying files
  lhm --show-diff --definition project.licenseheader src/

  # Remove headers that mention \"Copyright\"
  lhm --remove --keyword Copyright --modify src/
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  /// Files or directories to process. Directories are processed recursively.
  #[arg(required = true, value_name = "PATHS")]
  pub paths: Vec<PathBuf>,

  /// Header definition file (.licenseheader)
  #[arg(long, short = 'd', value_name = "FILE", required_unless_present = "remove")]
  pub definition: Option<PathBuf>,

  /// Remove existing headers instead of inserting or replacing them
  #[arg(long, conflicts_with = "definition")]
  pub remove: bool,

  /// Modify mode: write changes to the files
  #[arg(
    long,
    help = "Modify mode: write changes to the files

[default: dry run]"
  )]
  pub modify: bool,

  /// Show diff of changes in dry run mode
  #[arg(long, conflicts_with = "modify")]
  pub show_diff: bool,

  /// Save diff of changes to a file in dry run mode
  #[arg(long, short = 'o', value_name = "FILE", conflicts_with = "modify")]
  pub save_diff: Option<PathBuf>,

  /// Only replace or remove existing headers containing this keyword
  /// (repeatable, case-insensitive)
  #[arg(long = "keyword", short = 'k', value_name = "KEYWORD")]
  pub keywords: Vec<String>,

  /// Additional header property (repeatable, format: NAME=VALUE). Replaces
  /// %NAME% in the header.
  #[arg(long = "property", short = 'p', value_name = "NAME=VALUE")]
  pub properties: Vec<String>,

  /// Insert headers even if they contain text that is not a comment
  #[arg(long)]
  pub ignore_non_comment_text: bool,

  /// Maximum number of files processed at once
  #[arg(long, short = 'j', value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
  pub max_parallelism: Option<u64>,

  /// Path to config file (default: .lhm.toml in the current directory)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors and changed paths
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_definition_required_unless_remove() {
    assert!(Cli::try_parse_from(["lhm", "src"]).is_err());
    assert!(Cli::try_parse_from(["lhm", "--remove", "src"]).is_ok());
    assert!(Cli::try_parse_from(["lhm", "-d", "x.licenseheader", "src"]).is_ok());
  }

  #[test]
  fn test_remove_conflicts_with_definition() {
    assert!(Cli::try_parse_from(["lhm", "--remove", "-d", "x.licenseheader", "src"]).is_err());
  }

  #[test]
  fn test_repeatable_options() {
    let cli = Cli::try_parse_from([
      "lhm", "--remove", "-k", "Copyright", "-k", "License", "-p", "Owner=Me", "-j", "4", "-vv", "a.rs", "b.rs",
    ])
    .expect("valid arguments");

    assert_eq!(cli.keywords, vec!["Copyright".to_string(), "License".to_string()]);
    assert_eq!(cli.properties, vec!["Owner=Me".to_string()]);
    assert_eq!(cli.max_parallelism, Some(4));
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.paths.len(), 2);
  }

  #[test]
  fn test_zero_parallelism_is_rejected() {
    assert!(Cli::try_parse_from(["lhm", "--remove", "-j", "0", "src"]).is_err());
  }
}
