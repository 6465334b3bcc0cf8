use std::collections::BTreeMap;

use serde::Serialize;

/// The build manifest: logical asset names mapped to the physical
/// (possibly hashed) paths they landed at, plus the ordered asset list for
/// each entry point. Serialized with sorted keys so the JSON bytes are a
/// pure function of the build output.
#[derive(Debug, Default, Serialize)]
pub struct Manifest {
  /// `"app.js" -> "js/app-0a1b2c3d.js"`.
  pub assets: BTreeMap<String, String>,
  /// Entry name -> physical paths in load order (shared chunk first, then
  /// the entry chunk, then extracted stylesheets).
  pub entrypoints: BTreeMap<String, Vec<String>>,
  /// Split-point module (relative to the project root) -> the physical
  /// script a runtime must fetch for it. Covers dynamic-import targets,
  /// including ones that resolve to an already-loaded chunk.
  pub chunks: BTreeMap<String, String>,
}

impl Manifest {
  pub(crate) fn record_asset(&mut self, logical_name: String, physical_path: String) {
    self.assets.insert(logical_name, physical_path);
  }

  pub(crate) fn record_entrypoint_asset(&mut self, entry: &str, physical_path: String) {
    self
      .entrypoints
      .entry(entry.to_string())
      .or_default()
      .push(physical_path);
  }

  pub(crate) fn record_chunk(&mut self, split_point: String, physical_path: String) {
    self.chunks.insert(split_point, physical_path);
  }

  pub fn to_json(&self) -> String {
    // A map of strings cannot fail to serialize.
    serde_json::to_string_pretty(self).unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_is_stable_across_insertion_order() {
    let mut a = Manifest::default();
    a.record_asset("app.js".into(), "js/app-11111111.js".into());
    a.record_asset("about.js".into(), "js/about-22222222.js".into());

    let mut b = Manifest::default();
    b.record_asset("about.js".into(), "js/about-22222222.js".into());
    b.record_asset("app.js".into(), "js/app-11111111.js".into());

    assert_eq!(a.to_json(), b.to_json());
  }

  #[test]
  fn entrypoint_assets_keep_load_order() {
    let mut manifest = Manifest::default();
    manifest.record_entrypoint_asset("app", "js/shared-aa.js".into());
    manifest.record_entrypoint_asset("app", "js/app-bb.js".into());
    manifest.record_entrypoint_asset("app", "css/app-cc.css".into());

    assert_eq!(
      manifest.entrypoints["app"],
      vec!["js/shared-aa.js", "js/app-bb.js", "css/app-cc.css"]
    );
  }
}
