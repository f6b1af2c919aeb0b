//! # lhm
//!
//! A tool that inserts, replaces and removes license headers in source files.

use std::process::ExitCode;

use anyhow::Result;
use lhm::cli::{Cli, run};

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let cli = Cli::parse_args();
  run(cli).await
}
