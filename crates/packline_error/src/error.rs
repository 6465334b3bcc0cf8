use std::fmt::Display;
use std::path::Path;

use crate::{ErrorKind, StaticStr};

#[derive(Debug)]
pub struct Error {
  contexts: Vec<String>,
  pub kind: ErrorKind,
}

impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    self.kind.to_string().eq(&other.kind.to_string())
  }
}

impl Eq for Error {}

impl Error {
  fn with_kind(kind: ErrorKind) -> Self {
    Self {
      contexts: vec![],
      kind,
    }
  }

  pub fn context(mut self, context: String) -> Self {
    self.contexts.push(context);
    self
  }

  pub fn code(&self) -> &'static str {
    self.kind.code()
  }

  pub fn unresolved_entry(unresolved_id: impl AsRef<Path>) -> Self {
    Self::with_kind(ErrorKind::UnresolvedEntry {
      unresolved_id: unresolved_id.as_ref().to_path_buf(),
    })
  }

  pub fn unresolved_import(specifier: impl Into<String>, importer: impl AsRef<Path>) -> Self {
    Self::with_kind(ErrorKind::UnresolvedImport {
      specifier: specifier.into(),
      importer: importer.as_ref().to_path_buf(),
    })
  }

  pub fn transform_failed(
    id: impl AsRef<Path>,
    stage: impl Into<StaticStr>,
    source: anyhow::Error,
  ) -> Self {
    Self::with_kind(ErrorKind::Transform {
      id: id.as_ref().to_path_buf(),
      stage: stage.into(),
      source,
    })
  }

  pub fn optimize_failed(
    asset: impl Into<String>,
    stage: impl Into<StaticStr>,
    source: anyhow::Error,
  ) -> Self {
    Self::with_kind(ErrorKind::Optimize {
      asset: asset.into(),
      stage: stage.into(),
      source,
    })
  }

  pub fn configuration(reason: impl Into<StaticStr>) -> Self {
    Self::with_kind(ErrorKind::Configuration(reason.into()))
  }

  pub fn io_error(e: std::io::Error) -> Self {
    Self::with_kind(ErrorKind::IoError(e))
  }

  pub fn panic(msg: String) -> Self {
    anyhow::format_err!(msg).into()
  }
}

impl std::convert::From<anyhow::Error> for Error {
  fn from(value: anyhow::Error) -> Self {
    Self::with_kind(ErrorKind::Panic { source: value })
  }
}

impl std::convert::From<std::io::Error> for Error {
  fn from(value: std::io::Error) -> Self {
    Self::io_error(value)
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match &self.kind {
      ErrorKind::Panic { source, .. } => Some(source.as_ref()),
      ErrorKind::Transform { source, .. } => Some(source.as_ref()),
      ErrorKind::Optimize { source, .. } => Some(source.as_ref()),
      ErrorKind::IoError(source) => Some(source),
      _ => None,
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for ctx in self.contexts.iter().rev() {
      writeln!(f, "context: {ctx}")?;
    }

    self.kind.fmt(f)
  }
}
