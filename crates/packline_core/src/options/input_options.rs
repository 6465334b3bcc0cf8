use std::path::PathBuf;
use std::sync::Arc;

use derivative::Derivative;
use packline_common::Mode;
use packline_plugin::TransformStage;

use crate::{BuildError, BuildResult, WarningHandler};

/// One declared build root: a logical name mapped to an import specifier.
#[derive(Debug, Clone)]
pub struct InputItem {
  pub name: String,
  pub import: String,
}

impl InputItem {
  pub fn new(name: impl Into<String>, import: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      import: import.into(),
    }
  }
}

/// A `(match pattern, stage chain)` pair. Rules are evaluated top-down and
/// the first matching pattern wins; rules are never merged.
///
/// A rule declared `chained` runs its stages in reverse declaration order:
/// the last-declared stage receives the raw input first, pipe-style. This
/// mirrors how loader chains are conventionally written and is explicit per
/// rule because it is a common source of ordering bugs.
#[derive(Debug, Clone)]
pub struct TransformRule {
  pub pattern: String,
  pub stages: Vec<Arc<dyn TransformStage>>,
  pub chained: bool,
}

impl TransformRule {
  pub fn new(pattern: impl Into<String>, stages: Vec<Arc<dyn TransformStage>>) -> Self {
    Self {
      pattern: pattern.into(),
      stages,
      chained: false,
    }
  }

  pub fn chained(mut self) -> Self {
    self.chained = true;
    self
  }
}

pub fn default_warning_handler() -> WarningHandler {
  Arc::new(|err| {
    eprintln!("{err}");
  })
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct InputOptions {
  pub input: Vec<InputItem>,
  pub mode: Mode,
  pub cwd: PathBuf,
  pub rules: Vec<TransformRule>,
  /// Ordered extension list used for resolver inference.
  pub resolve_extensions: Vec<String>,
  /// Names of environment variables exposed to transform stages.
  pub env_passthrough: Vec<String>,
  #[derivative(Debug = "ignore")]
  pub on_warn: WarningHandler,
}

impl Default for InputOptions {
  fn default() -> Self {
    Self {
      input: Default::default(),
      mode: Mode::Development,
      cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
      rules: crate::default_rules(),
      resolve_extensions: ["js", "jsx", "ts", "tsx", "css", "scss"]
        .map(String::from)
        .to_vec(),
      env_passthrough: Default::default(),
      on_warn: default_warning_handler(),
    }
  }
}

impl InputOptions {
  /// Entry validation. Detected before any module is read, so a malformed
  /// configuration can never leave partial artifacts behind.
  pub(crate) fn validate(&self) -> BuildResult<()> {
    if self.input.is_empty() {
      return Err(BuildError::configuration("at least one entry is required"));
    }
    for item in &self.input {
      if item.name.is_empty() || item.import.is_empty() {
        return Err(BuildError::configuration(
          "entry name and import must be non-empty",
        ));
      }
    }
    let mut names: Vec<&str> = self.input.iter().map(|item| item.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != self.input.len() {
      return Err(BuildError::configuration("entry names must be unique"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_duplicate_entry_names() {
    let opts = InputOptions {
      input: vec![InputItem::new("app", "src/a.js"), InputItem::new("app", "src/b.js")],
      ..Default::default()
    };
    let err = opts.validate().unwrap_err();
    assert_eq!(err.code(), "INVALID_CONFIG");
  }

  #[test]
  fn rejects_empty_entries() {
    let opts = InputOptions::default();
    assert!(opts.validate().is_err());
  }
}
