//! # Run Command
//!
//! This module wires the command-line arguments to the replacer: it loads the
//! configuration and header definitions, collects the files, runs the batch
//! and reports the outcome.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::Cli;
use super::files::collect_files;
use crate::config::{Config, load_config};
use crate::diff::DiffManager;
use crate::header::{AdditionalProperty, HeaderDefinitionMap};
use crate::logging::{init_tracing, print_error_log, set_quiet, set_verbose};
use crate::output::{RunSummary, print_changed_files, print_errors, print_hint, print_start_message, print_summary};
use crate::replacer::{
  ContentInput, DEFAULT_MAX_PARALLELISM, PathInput, Replacer, ReplacerError, ReplacerErrorKind, ReplacerProgress,
};
use crate::verbose_log;

/// Exit code used when the run was interrupted.
const EXIT_CANCELLED: u8 = 130;

/// Runs lhm with the given arguments.
///
/// # Returns
///
/// Success when no file failed and, in dry run mode, no file would change.
///
/// # Errors
///
/// Returns an error if the configuration or the header definition file cannot
/// be loaded.
pub async fn run(args: Cli) -> Result<ExitCode> {
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let root = std::env::current_dir().context("Failed to determine the current directory")?;
  let config = load_config(args.config.as_deref(), &root, args.no_config)?.unwrap_or_default();

  let headers = load_headers(&args)?;
  let properties = parse_properties(&args.properties)?;
  let replacer = build_replacer(&args, &config);
  debug!(
    "Using {} language(s), parallelism {}",
    replacer.languages().len(),
    replacer.max_parallelism()
  );

  let files = collect_files(&args.paths, &replacer);
  print_start_message(files.len(), args.modify);

  let cancel = CancellationToken::new();
  let ctrl_c = spawn_ctrl_c_handler(cancel.clone());

  let (progress_sender, progress_receiver) = mpsc::unbounded_channel();
  let progress = tokio::spawn(log_progress(progress_receiver));

  let start_time = Instant::now();
  let outcome = if args.modify {
    let inputs = files
      .into_iter()
      .map(|path| {
        PathInput::new(path, headers.clone())
          .with_properties(properties.clone())
          .with_ignore_non_comment_text(args.ignore_non_comment_text)
      })
      .collect();
    modify_files(&replacer, inputs, progress_sender, &cancel).await
  } else {
    let diff_manager = DiffManager::new(args.show_diff, args.save_diff.clone());
    let inputs = read_inputs(files, headers.as_ref(), &properties, args.ignore_non_comment_text).await;
    check_files(&replacer, inputs, progress_sender, &cancel, &diff_manager).await
  };

  ctrl_c.abort();
  let _ = progress.await;

  let Some(mut summary) = outcome? else {
    print_error_log("Cancelled, some files may not have been processed.");
    return Ok(ExitCode::from(EXIT_CANCELLED));
  };
  summary.processing_time = start_time.elapsed();

  let dry_run = !args.modify;
  print_changed_files(&summary, Some(&root), dry_run);
  print_errors(&summary.errors);
  print_summary(&summary, dry_run);

  let would_change = dry_run && summary.changed_count() > 0;
  if would_change {
    print_hint("Run with --modify to apply these changes.");
  }

  if !summary.errors.is_empty() || would_change {
    return Ok(ExitCode::FAILURE);
  }
  Ok(ExitCode::SUCCESS)
}

/// Loads the header definition file, or returns `None` in remove mode.
fn load_headers(args: &Cli) -> Result<Option<Arc<HeaderDefinitionMap>>> {
  if args.remove {
    return Ok(None);
  }

  let Some(definition) = args.definition.as_deref() else {
    bail!("Missing required argument: --definition <FILE>");
  };

  let headers = HeaderDefinitionMap::load(definition)?;
  if headers.is_empty() {
    bail!(
      "Header definition file {} defines no extensions (expected lines like `extensions: .rs .cs`)",
      definition.display()
    );
  }

  verbose_log!("Loaded headers for {} extension(s)", headers.len());
  Ok(Some(Arc::new(headers)))
}

/// Parses `NAME=VALUE` arguments into `%NAME%` properties.
fn parse_properties(arguments: &[String]) -> Result<Vec<AdditionalProperty>> {
  arguments
    .iter()
    .map(|argument| {
      let Some((name, value)) = argument.split_once('=') else {
        bail!("Invalid property '{argument}', expected NAME=VALUE");
      };
      let name = name.trim().trim_matches('%');
      if name.is_empty() {
        bail!("Invalid property '{argument}', the name is empty");
      }
      Ok(AdditionalProperty::new(format!("%{name}%"), value))
    })
    .collect()
}

/// Command-line values take precedence over the configuration file.
fn build_replacer(args: &Cli, config: &Config) -> Replacer {
  let keywords = if args.keywords.is_empty() {
    config.keywords.clone()
  } else {
    args.keywords.clone()
  };

  let max_parallelism = args
    .max_parallelism
    .and_then(|n| usize::try_from(n).ok())
    .or(config.max_parallelism)
    .unwrap_or(DEFAULT_MAX_PARALLELISM);

  Replacer::new(config.languages_with_defaults(), keywords).with_max_parallelism(max_parallelism)
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("Interrupted, cancelling remaining files");
      cancel.cancel();
    }
  })
}

async fn log_progress(mut receiver: mpsc::UnboundedReceiver<ReplacerProgress>) {
  while let Some(progress) = receiver.recv().await {
    verbose_log!(
      "[{}/{}] {}",
      progress.processed_files,
      progress.total_files,
      progress.path.display()
    );
  }
}

async fn modify_files(
  replacer: &Replacer,
  inputs: Vec<PathInput>,
  progress: mpsc::UnboundedSender<ReplacerProgress>,
  cancel: &CancellationToken,
) -> Result<Option<RunSummary>> {
  let Ok(report) = replacer.remove_or_replace_headers(inputs, Some(progress), cancel).await else {
    return Ok(None);
  };

  let mut summary = RunSummary::default();
  summary.unchanged = report.processed - report.changed.len() - report.errors.len();
  for (path, action) in report.changed {
    summary.record_action(path, action);
  }
  for error in report.errors {
    summary.record_error(error);
  }

  Ok(Some(summary))
}

async fn check_files(
  replacer: &Replacer,
  inputs: Vec<Result<ContentInput, ReplacerError>>,
  progress: mpsc::UnboundedSender<ReplacerProgress>,
  cancel: &CancellationToken,
  diff_manager: &DiffManager,
) -> Result<Option<RunSummary>> {
  let mut summary = RunSummary::default();

  // Inputs that could not be read are reported directly.
  let mut readable = Vec::with_capacity(inputs.len());
  for input in inputs {
    match input {
      Ok(input) => readable.push(input),
      Err(error) => summary.record_error(error),
    }
  }

  let originals: HashMap<PathBuf, ContentInput> =
    readable.iter().map(|input| (input.path.clone(), input.clone())).collect();

  let Ok(batch) = replacer
    .remove_or_replace_headers_content(readable, Some(progress), cancel)
    .await
  else {
    return Ok(None);
  };

  let mut seen = HashSet::with_capacity(batch.results.len());
  for result in batch.results {
    match result {
      Ok(success) => {
        if success.action.is_change()
          && diff_manager.is_enabled()
          && let Some(original) = originals.get(&success.path)
        {
          diff_manager.display_diff(&success.path, &original.content, &success.content)?;
        }
        seen.insert(success.path.clone());
        summary.record_action(success.path, success.action);
      }
      Err(error) => {
        seen.insert(error.path.clone());
        summary.record_error(error);
      }
    }
  }

  // The content batch leaves out inputs it could not build a document for;
  // recover the reason so that dry run and modify mode report the same.
  for (path, input) in originals {
    if seen.contains(&path) {
      continue;
    }
    if let Err(e) = replacer.try_create_document(&input) {
      summary.record_error(e.into_replacer_error(None));
    }
  }

  Ok(Some(summary))
}

async fn read_inputs(
  files: Vec<PathBuf>,
  headers: Option<&Arc<HeaderDefinitionMap>>,
  properties: &[AdditionalProperty],
  ignore_non_comment_text: bool,
) -> Vec<Result<ContentInput, ReplacerError>> {
  let mut inputs = Vec::with_capacity(files.len());
  for path in files {
    let input = match tokio::fs::read_to_string(&path).await {
      Ok(content) => Ok(
        ContentInput::new(path, content, headers.cloned())
          .with_properties(properties.to_vec())
          .with_ignore_non_comment_text(ignore_non_comment_text),
      ),
      Err(e) => Err(read_error(&path, &e)),
    };
    inputs.push(input);
  }
  inputs
}

fn read_error(path: &Path, error: &std::io::Error) -> ReplacerError {
  let kind = if error.kind() == std::io::ErrorKind::NotFound {
    ReplacerErrorKind::FileNotFound
  } else {
    ReplacerErrorKind::Miscellaneous
  };
  ReplacerError::new(path, None, kind, format!("Failed to read {}: {error}", path.display()))
}
