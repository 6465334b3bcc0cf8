use dashmap::DashMap;
use packline_common::{Content, DependencyKind, FileClass, ModuleId};
use packline_plugin::AuxiliaryAsset;

/// A transformed module carried across builds. Valid only while both its
/// source digest and its stage-chain configuration are unchanged.
#[derive(Debug, Clone)]
pub struct CachedTransform {
  pub source_digest: String,
  pub stage_key: String,
  pub class: FileClass,
  pub content: Content,
  /// Specifiers as authored. Resolution is redone per build against the
  /// fresh filesystem snapshot, so a cached module can never pin a stale
  /// resolution.
  pub specifiers: Vec<(String, DependencyKind)>,
  pub auxiliary: Vec<AuxiliaryAsset>,
}

/// The content-addressed incremental cache. This and the identity map are
/// the only concurrently mutated build structures; `DashMap` gives per-key
/// claims instead of one coarse lock over the worker pool.
#[derive(Debug, Default)]
pub struct BuildCache {
  inner: DashMap<ModuleId, CachedTransform>,
}

impl BuildCache {
  pub fn get_valid(&self, id: &ModuleId, source_digest: &str, stage_key: &str) -> Option<CachedTransform> {
    let entry = self.inner.get(id)?;
    if entry.source_digest == source_digest && entry.stage_key == stage_key {
      Some(entry.clone())
    } else {
      None
    }
  }

  /// Last writer wins; entries are interchangeable for identical keys, so
  /// which racing worker lands the write is not observable in output.
  pub fn store(&self, id: ModuleId, entry: CachedTransform) {
    self.inner.insert(id, entry);
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(digest: &str, stage_key: &str) -> CachedTransform {
    CachedTransform {
      source_digest: digest.to_string(),
      stage_key: stage_key.to_string(),
      class: FileClass::Script,
      content: Content::Text("transformed".into()),
      specifiers: vec![],
      auxiliary: vec![],
    }
  }

  #[test]
  fn hit_requires_digest_and_stage_key() {
    let cache = BuildCache::default();
    let id = ModuleId::new("/app/src/index.js");
    cache.store(id.clone(), entry("d1", "s1"));

    assert!(cache.get_valid(&id, "d1", "s1").is_some());
    // A source edit invalidates.
    assert!(cache.get_valid(&id, "d2", "s1").is_none());
    // A rule/stage configuration change invalidates too.
    assert!(cache.get_valid(&id, "d1", "s2").is_none());
  }
}
