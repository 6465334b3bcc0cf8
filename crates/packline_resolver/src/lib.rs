use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use sugar_path::SugarPath;

/// The set of files that existed when the build started. Resolution is a pure
/// function over this snapshot, so a build never observes files created or
/// deleted while it is running.
#[derive(Debug, Default)]
pub struct FsSnapshot {
  files: FxHashSet<PathBuf>,
}

impl FsSnapshot {
  pub fn capture(root: &Path) -> std::io::Result<Self> {
    let mut files = FxHashSet::default();
    for entry in walkdir::WalkDir::new(root) {
      let entry = entry.map_err(std::io::Error::other)?;
      if entry.file_type().is_file() {
        files.insert(entry.into_path().normalize());
      }
    }
    Ok(Self { files })
  }

  pub fn from_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
    Self {
      files: files.into_iter().collect(),
    }
  }

  pub fn contains(&self, path: &Path) -> bool {
    self.files.contains(path)
  }
}

#[derive(Debug)]
pub struct Resolver {
  cwd: PathBuf,
  extensions: Vec<String>,
  snapshot: FsSnapshot,
}

impl Resolver {
  pub fn new(cwd: PathBuf, extensions: Vec<String>, snapshot: FsSnapshot) -> Self {
    Self {
      cwd,
      extensions,
      snapshot,
    }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }

  /// Maps a specifier plus importer location to a canonical module id.
  /// Tries the exact path first, then extension inference over the configured
  /// ordered list, then a directory index fallback.
  pub fn resolve(&self, importer: Option<&str>, specifier: &str) -> packline_error::Result<String> {
    let (bare, fragment) = match specifier.split_once('#') {
      Some((bare, fragment)) if !fragment.is_empty() => (bare, Some(fragment)),
      _ => (specifier, None),
    };

    let base = if Path::new(bare).is_absolute() {
      Path::new(bare).to_path_buf()
    } else if let Some(importer) = importer {
      let importer_dir = Path::new(importer)
        .parent()
        .unwrap_or_else(|| Path::new("/"));
      importer_dir.join(bare).normalize()
    } else {
      self.cwd.join(bare).normalize()
    };

    match self.probe(&base) {
      Some(found) => {
        let mut id = found.to_string_lossy().into_owned();
        if let Some(fragment) = fragment {
          id.push('#');
          id.push_str(fragment);
        }
        Ok(id)
      }
      None => Err(packline_error::Error::unresolved_import(
        specifier,
        importer.unwrap_or_else(|| self.cwd.to_str().unwrap_or("")),
      )),
    }
  }

  fn probe(&self, base: &Path) -> Option<PathBuf> {
    if self.snapshot.contains(base) {
      return Some(base.to_path_buf());
    }

    // Extension inference: `./util` -> `./util.js`, `./util.ts`, ...
    for ext in &self.extensions {
      let candidate = with_appended_extension(base, ext);
      if self.snapshot.contains(&candidate) {
        return Some(candidate);
      }
    }

    // Directory index fallback: `./pages` -> `./pages/index.js`, ...
    for ext in &self.extensions {
      let candidate = base.join(format!("index.{ext}"));
      if self.snapshot.contains(&candidate) {
        return Some(candidate);
      }
    }

    None
  }
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
  let mut s = path.as_os_str().to_os_string();
  s.push(".");
  s.push(ext);
  PathBuf::from(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resolver() -> Resolver {
    let snapshot = FsSnapshot::from_files(
      [
        "/app/src/index.ts",
        "/app/src/util.js",
        "/app/src/util.ts",
        "/app/src/pages/index.tsx",
        "/app/src/logo.svg",
      ]
      .into_iter()
      .map(PathBuf::from),
    );
    Resolver::new(
      PathBuf::from("/app"),
      ["js", "jsx", "ts", "tsx"].map(String::from).to_vec(),
      snapshot,
    )
  }

  #[test]
  fn resolves_entry_relative_to_cwd() {
    assert_eq!(resolver().resolve(None, "src/index.ts").unwrap(), "/app/src/index.ts");
    assert_eq!(resolver().resolve(None, "./src/index").unwrap(), "/app/src/index.ts");
  }

  #[test]
  fn extension_inference_follows_configured_order() {
    // Both util.js and util.ts exist; .js is listed first.
    let id = resolver()
      .resolve(Some("/app/src/index.ts"), "./util")
      .unwrap();
    assert_eq!(id, "/app/src/util.js");
  }

  #[test]
  fn directory_index_fallback() {
    let id = resolver()
      .resolve(Some("/app/src/index.ts"), "./pages")
      .unwrap();
    assert_eq!(id, "/app/src/pages/index.tsx");
  }

  #[test]
  fn fragment_is_preserved() {
    let id = resolver()
      .resolve(Some("/app/src/index.ts"), "./logo.svg#raw")
      .unwrap();
    assert_eq!(id, "/app/src/logo.svg#raw");
  }

  #[test]
  fn unresolvable_specifier_errors() {
    let err = resolver()
      .resolve(Some("/app/src/index.ts"), "./missing")
      .unwrap_err();
    assert_eq!(err.code(), "UNRESOLVED_IMPORT");
  }
}
