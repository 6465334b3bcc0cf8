use std::fmt::Display;
use std::path::PathBuf;

use crate::error_code;

pub type StaticStr = std::borrow::Cow<'static, str>;

#[derive(Debug)]
pub enum ErrorKind {
  /// An entry specifier could not be resolved. Always fatal.
  UnresolvedEntry {
    unresolved_id: PathBuf,
  },
  /// A specifier inside a module could not be resolved. Fatal to the owning
  /// module in development mode, fatal to the build in production mode.
  UnresolvedImport {
    specifier: String,
    importer: PathBuf,
  },
  /// A transform stage failed for one module.
  Transform {
    id: PathBuf,
    stage: StaticStr,
    source: anyhow::Error,
  },
  /// A production optimization pass failed for one asset.
  Optimize {
    asset: String,
    stage: StaticStr,
    source: anyhow::Error,
  },
  /// Malformed entries, rules or templates. Detected before any work starts.
  Configuration(StaticStr),

  Panic {
    source: anyhow::Error,
  },

  IoError(std::io::Error),
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ErrorKind::UnresolvedEntry { unresolved_id } => {
        write!(f, "Could not resolve entry module \"{}\"", unresolved_id.display())
      }
      ErrorKind::UnresolvedImport { specifier, importer } => write!(
        f,
        "Could not resolve \"{specifier}\" imported by \"{}\"",
        importer.display()
      ),
      ErrorKind::Transform { id, stage, source } => write!(
        f,
        "Transform stage \"{stage}\" failed for \"{}\": {source}",
        id.display()
      ),
      ErrorKind::Optimize { asset, stage, source } => {
        write!(f, "Optimization stage \"{stage}\" failed for \"{asset}\": {source}")
      }
      ErrorKind::Configuration(reason) => write!(f, "Invalid configuration: {reason}"),
      ErrorKind::Panic { source } => source.fmt(f),
      ErrorKind::IoError(e) => e.fmt(f),
    }
  }
}

impl ErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      ErrorKind::UnresolvedEntry { .. } => error_code::UNRESOLVED_ENTRY,
      ErrorKind::UnresolvedImport { .. } => error_code::UNRESOLVED_IMPORT,
      ErrorKind::Transform { .. } => error_code::TRANSFORM_FAILED,
      ErrorKind::Optimize { .. } => error_code::OPTIMIZE_FAILED,
      ErrorKind::Configuration(_) => error_code::INVALID_CONFIG,
      ErrorKind::Panic { .. } => error_code::PANIC,
      ErrorKind::IoError(_) => error_code::IO_ERROR,
    }
  }
}
