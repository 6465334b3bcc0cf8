use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use packline_core::{BuildError, WarningHandler};
use tempfile::TempDir;

/// An on-disk project scaffold. Files are written under a temp directory
/// that is removed when the fixture is dropped.
pub struct Fixture {
  // Held for its Drop; deletes the directory when the fixture goes away.
  _dir: TempDir,
  root: PathBuf,
}

impl Default for Fixture {
  fn default() -> Self {
    Self::new()
  }
}

impl Fixture {
  pub fn new() -> Self {
    let dir = tempfile::tempdir().expect("create fixture dir");
    // Canonicalized so ids match the resolver's normalized snapshot paths.
    let root = dir.path().canonicalize().expect("canonicalize fixture dir");
    Self { _dir: dir, root }
  }

  /// Builder-style file creation for initial project layout.
  pub fn file(self, relative: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
    self.write(relative, content);
    self
  }

  /// In-place write, for edits between builds.
  pub fn write(&self, relative: impl AsRef<Path>, content: impl AsRef<[u8]>) {
    let path = self.root.join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).expect("create fixture dirs");
    }
    std::fs::write(path, content).expect("write fixture file");
  }

  pub fn root(&self) -> PathBuf {
    self.root.clone()
  }

  pub fn out_dir(&self) -> PathBuf {
    self.root.join("dist")
  }

  pub fn read_to_string(&self, relative: impl AsRef<Path>) -> String {
    let path = self.root.join(relative);
    std::fs::read_to_string(&path)
      .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
  }

  pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
    self.root.join(relative).exists()
  }
}

/// Collects warnings emitted through `on_warn` for later assertions.
#[derive(Default, Clone)]
pub struct WarningLog {
  inner: Arc<Mutex<Vec<(String, String)>>>,
}

impl WarningLog {
  pub fn handler(&self) -> WarningHandler {
    let inner = self.inner.clone();
    Arc::new(move |err: &BuildError| {
      inner
        .lock()
        .expect("warning log lock")
        .push((err.code().to_string(), err.to_string()));
    })
  }

  pub fn codes(&self) -> Vec<String> {
    self
      .inner
      .lock()
      .expect("warning log lock")
      .iter()
      .map(|(code, _)| code.clone())
      .collect()
  }

  pub fn messages(&self) -> Vec<String> {
    self
      .inner
      .lock()
      .expect("warning log lock")
      .iter()
      .map(|(_, message)| message.clone())
      .collect()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.lock().expect("warning log lock").is_empty()
  }
}
