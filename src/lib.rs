//! # lhm
//!
//! A license header manager: it inserts, replaces and removes the license
//! header comment at the top of source files, for many languages at once.
//!
//! `lhm` never parses the languages it edits. It only knows each language's
//! comment and region delimiters, which is enough to find the leading comment
//! block of a file, and it leaves everything after that block untouched,
//! including the file's line-ending style and any preamble (shebang lines,
//! XML declarations, reference directives) that has to stay above the header.
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use lhm::header::HeaderDefinitionMap;
//! use lhm::language::Language;
//! use lhm::replacer::{PathInput, Replacer};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let headers = Arc::new(HeaderDefinitionMap::load(Path::new("project.licenseheader"))?);
//!     let replacer = Replacer::new(Language::defaults(), vec!["copyright".to_string()]);
//!
//!     let inputs = vec![PathInput::new("src/main.rs", Some(headers))];
//!     let report = replacer
//!         .remove_or_replace_headers(inputs, None, &CancellationToken::new())
//!         .await?;
//!
//!     for error in &report.errors {
//!         eprintln!("{}: {}", error.kind, error.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`comment_parser`] - Extraction of the leading comment block of a text
//! * [`line_endings`] - Line-ending detection and normalization
//! * [`language`] - Comment grammars and the built-in language table
//! * [`header`] - Header definitions, properties and the per-file document
//! * [`replacer`] - Single-file and concurrent batch operations
//! * [`config`] - The `.lhm.toml` configuration file
//! * [`logging`] - Logging utilities for user-facing output

pub mod cli;
pub mod comment_parser;
pub mod config;
pub mod diff;
pub mod header;
pub mod language;
pub mod line_endings;
pub mod logging;
pub mod output;
pub mod replacer;
