use std::path::{Component, Path};

use sha2::{Digest, Sha256};
use sugar_path::SugarPath;

/// Full digest of raw source bytes, used as the incremental-cache validity
/// key.
pub fn content_digest(bytes: &[u8]) -> String {
  let digest = Sha256::digest(bytes);
  format!("{digest:x}")
}

/// Fixed-length hash embedded in physical filenames. A pure function of the
/// final, post-optimization bytes.
pub fn short_hash(bytes: &[u8]) -> String {
  let mut full = content_digest(bytes);
  full.truncate(8);
  full
}

/// Derives a stable logical chunk name from a module path, relative to the
/// project root: `/root/src/pages/lazy.ts` -> `src_pages_lazy`.
pub fn path_to_chunk_name(root: &str, path: &str) -> String {
  let mut relative = Path::new(path).relative(root);
  relative.set_extension("");
  itertools::Itertools::intersperse(
    relative
      .components()
      .filter(|com| matches!(com, Component::Normal(_)))
      .filter_map(|seg| seg.as_os_str().to_str()),
    "_",
  )
  .fold(String::new(), |mut acc, seg| {
    acc.push_str(seg);
    acc
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_hash_is_pure_and_fixed_length() {
    assert_eq!(short_hash(b"hello"), short_hash(b"hello"));
    assert_eq!(short_hash(b"hello").len(), 8);
    assert_ne!(short_hash(b"hello"), short_hash(b"hello!"));
  }

  #[test]
  fn chunk_name_from_path() {
    assert_eq!(
      path_to_chunk_name("/root", "/root/src/pages/lazy.ts"),
      "src_pages_lazy"
    );
    assert_eq!(path_to_chunk_name("/root", "/root/index.js"), "index");
  }
}
