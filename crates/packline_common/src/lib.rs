use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

mod content;
pub use content::*;
mod file_class;
pub use file_class::*;

/// Canonical identity of a module: an absolute path plus an optional named
/// fragment (`src/icon.svg#raw`). Immutable once created and the unique key
/// of the module graph.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct ModuleId {
  path: Arc<str>,
  fragment: Option<Arc<str>>,
}

impl ModuleId {
  pub fn new(value: impl AsRef<str>) -> Self {
    let value = value.as_ref();
    match value.split_once('#') {
      Some((path, fragment)) if !fragment.is_empty() => Self {
        path: path.into(),
        fragment: Some(fragment.into()),
      },
      _ => Self {
        path: value.into(),
        fragment: None,
      },
    }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn as_path(&self) -> &Path {
    Path::new(self.path.as_ref())
  }

  pub fn fragment(&self) -> Option<&str> {
    self.fragment.as_deref()
  }
}

impl Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.fragment {
      Some(fragment) => write!(f, "{}#{}", self.path, fragment),
      None => write!(f, "{}", self.path),
    }
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    &self.path
  }
}

#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct ChunkId(Arc<str>);

impl ChunkId {
  pub fn new(value: impl Into<Arc<str>>) -> Self {
    Self(value.into())
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl From<String> for ChunkId {
  fn from(value: String) -> Self {
    Self(value.into())
  }
}

impl From<&str> for ChunkId {
  fn from(value: &str) -> Self {
    Self(value.into())
  }
}

impl AsRef<str> for ChunkId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl Display for ChunkId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
  Entry,
  Shared,
  Async,
}

/// Dynamic edges are chunk boundaries, static edges are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
  Static,
  DynamicAsync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Development,
  Production,
}

impl Mode {
  pub fn is_production(self) -> bool {
    self == Mode::Production
  }

  /// Whether any error aborts the whole build with no artifacts written.
  pub fn bails(self) -> bool {
    self.is_production()
  }
}
