//! # Configuration Module
//!
//! This module provides configuration support for lhm, allowing users to add
//! or override language definitions, set the keywords that guard existing
//! headers, and tune batch parallelism.
//!
//! Configuration can be specified in a `.lhm.toml` file or via the
//! `LHM_CONFIG` environment variable:
//!
//! ```toml
//! max-parallelism = 8
//! keywords = ["copyright", "license"]
//!
//! [[languages]]
//! extensions = [".vb"]
//! line-comment = "'"
//! region-start = "#Region"
//! region-end = "#End Region"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::language::{Language, LanguageError};
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".lhm.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "LHM_CONFIG";

/// Main configuration struct for lhm.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
  /// Maximum number of files processed at once.
  #[serde(default)]
  pub max_parallelism: Option<usize>,

  /// Existing headers are only replaced or removed if they contain one of
  /// these keywords.
  #[serde(default)]
  pub keywords: Vec<String>,

  /// Language definitions. They are consulted before the built-in ones.
  #[serde(default)]
  pub languages: Vec<Language>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A language definition is invalid.
  #[error("Invalid language #{index} in config: {source}")]
  InvalidLanguage { index: usize, source: LanguageError },

  /// `max-parallelism` is zero.
  #[error("max-parallelism must be at least 1")]
  InvalidParallelism,
}

impl Config {
  /// Reads, parses and validates the config file at `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, parsed or validated. Parse
  /// errors carry `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
      path: path.to_path_buf(),
      source,
    })?;

    let config = Self::parse(&content).map_err(|e| match e {
      ConfigError::ParseError { source, .. } => ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
      },
      other => other,
    })?;

    verbose_log!("Loaded {} language definition(s)", config.languages.len());

    Ok(config)
  }

  /// Parses and validates configuration text.
  ///
  /// # Errors
  ///
  /// Returns an error if the text is not valid TOML or fails validation.
  pub fn parse(content: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
      path: PathBuf::new(),
      source: e,
    })?;

    config.validate()?;

    Ok(config.normalize())
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - Every language definition is valid
  /// - `max-parallelism`, if set, is not zero
  fn validate(&self) -> Result<(), ConfigError> {
    for (index, language) in self.languages.iter().enumerate() {
      language
        .validate()
        .map_err(|source| ConfigError::InvalidLanguage { index, source })?;
    }

    if self.max_parallelism == Some(0) {
      return Err(ConfigError::InvalidParallelism);
    }

    Ok(())
  }

  /// Normalizes extensions and drops blank keywords.
  fn normalize(self) -> Self {
    Self {
      max_parallelism: self.max_parallelism,
      keywords: self
        .keywords
        .into_iter()
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect(),
      languages: self.languages.iter().map(Language::normalized).collect(),
    }
  }

  /// Returns the configured languages followed by the built-in ones.
  pub fn languages_with_defaults(&self) -> Vec<Language> {
    self.languages.iter().cloned().chain(Language::defaults()).collect()
  }
}

/// Where the configuration file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
  /// `--config`
  Flag,
  /// The `LHM_CONFIG` environment variable
  Environment,
  /// `.lhm.toml` in the working directory
  Local,
}

/// Finds the configuration file to use.
///
/// `--config` wins, then `LHM_CONFIG`, then `.lhm.toml` in `root`. An explicit
/// path is returned even if it does not exist, so that loading it fails
/// loudly. A missing environment path falls through to the local file.
pub fn discover_config_path(explicit_path: Option<&Path>, root: &Path) -> Option<(PathBuf, ConfigSource)> {
  if let Some(path) = explicit_path {
    return Some((path.to_path_buf(), ConfigSource::Flag));
  }

  let from_env = std::env::var_os(CONFIG_ENV_VAR)
    .filter(|value| !value.is_empty())
    .map(PathBuf::from);
  if let Some(path) = from_env {
    if path.is_file() {
      return Some((path, ConfigSource::Environment));
    }
    verbose_log!("Ignoring {}, {} is not a file", CONFIG_ENV_VAR, path.display());
  }

  Some(root.join(DEFAULT_CONFIG_FILENAME))
    .filter(|path| path.is_file())
    .map(|path| (path, ConfigSource::Local))
}

/// Loads the configuration for a run.
///
/// # Parameters
///
/// * `explicit_path` - Value of `--config`
/// * `root` - Directory searched for `.lhm.toml`
/// * `no_config` - `--no-config`; disables discovery entirely
///
/// # Returns
///
/// `None` if discovery is disabled or no file was found.
///
/// # Errors
///
/// Returns an error if the discovered file cannot be loaded.
pub fn load_config(explicit_path: Option<&Path>, root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Not looking for a config file (--no-config)");
    return Ok(None);
  }

  let Some((path, source)) = discover_config_path(explicit_path, root) else {
    verbose_log!("No config file found");
    return Ok(None);
  };

  verbose_log!("Using config {} ({:?})", path.display(), source);
  Config::load(&path)
    .map(Some)
    .with_context(|| format!("Failed to load config from {}", path.display()))
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_parse_valid_config() {
    let config = Config::parse(concat!(
      "max-parallelism = 4\n",
      "keywords = [\"Copyright\", \"  \"]\n",
      "\n",
      "[[languages]]\n",
      "extensions = [\"XYZ\"]\n",
      "line-comment = \"%%\"\n",
    ))
    .expect("valid config");

    assert_eq!(config.max_parallelism, Some(4));
    assert_eq!(config.keywords, vec!["Copyright".to_string()]);
    assert_eq!(config.languages.len(), 1);
    assert_eq!(config.languages[0].extensions, vec![".xyz".to_string()]);
  }

  #[test]
  fn test_parse_empty_config() {
    let config = Config::parse("").expect("empty config");
    assert_eq!(config, Config::default());
  }

  #[test]
  fn test_validate_language() {
    let result = Config::parse(concat!(
      "[[languages]]\n",
      "extensions = [\".x\"]\n",
      "line-comment = \"//\"\n",
      "region-start = \"#region\"\n",
    ));
    assert!(matches!(result, Err(ConfigError::InvalidLanguage { index: 0, .. })));
  }

  #[test]
  fn test_validate_parallelism() {
    let result = Config::parse("max-parallelism = 0\n");
    assert!(matches!(result, Err(ConfigError::InvalidParallelism)));
  }

  #[test]
  fn test_invalid_toml() {
    let result = Config::parse("keywords = [");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
  }

  #[test]
  fn test_configured_languages_come_first() {
    let config = Config::parse(concat!(
      "[[languages]]\n",
      "extensions = [\".cs\"]\n",
      "line-comment = \"#\"\n",
    ))
    .expect("valid config");

    let languages = config.languages_with_defaults();
    assert_eq!(languages[0].line_comment.as_deref(), Some("#"));
    assert!(languages.len() > 1);
  }

  #[test]
  fn test_load_config_from_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&path, "keywords = [\"license\"]\n").expect("write config");

    let config = load_config(None, dir.path(), false).expect("load").expect("config found");
    assert_eq!(config.keywords, vec!["license".to_string()]);
  }

  #[test]
  fn test_load_config_reports_path_on_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "max-parallelism = \"many\"\n").expect("write config");

    match Config::load(&path) {
      Err(ConfigError::ParseError { path: reported, .. }) => assert_eq!(reported, path),
      other => panic!("unexpected result: {other:?}"),
    }
  }

  #[test]
  fn test_load_config_disabled() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join(DEFAULT_CONFIG_FILENAME), "").expect("write config");

    assert!(load_config(None, dir.path(), true).expect("load").is_none());
  }

  #[test]
  fn test_discover_config_explicit_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "").expect("write config");

    assert_eq!(
      discover_config_path(Some(&path), dir.path()),
      Some((path, ConfigSource::Flag))
    );

    let missing = dir.path().join("missing.toml");
    assert_eq!(
      discover_config_path(Some(&missing), dir.path()),
      Some((missing.clone(), ConfigSource::Flag))
    );
    assert!(matches!(
      Config::load(&missing),
      Err(ConfigError::ReadError { .. })
    ));
  }

  #[test]
  fn test_discover_local_config() {
    let dir = TempDir::new().expect("tempdir");
    if std::env::var_os(CONFIG_ENV_VAR).is_some() {
      return;
    }
    assert_eq!(discover_config_path(None, dir.path()), None);

    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    std::fs::write(&path, "").expect("write config");
    assert_eq!(
      discover_config_path(None, dir.path()),
      Some((path, ConfigSource::Local))
    );
  }
}
