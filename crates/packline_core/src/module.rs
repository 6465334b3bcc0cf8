use packline_common::{Content, DependencyKind, FileClass, ModuleId};
use packline_plugin::AuxiliaryAsset;
use rustc_hash::FxHashMap;

/// One node of the module graph. Owned exclusively by the graph once added.
#[derive(Debug)]
pub struct ModuleNode {
  pub id: ModuleId,
  pub class: FileClass,
  pub source_digest: String,
  pub stage_key: String,
  pub content: Content,
  /// Dependency specifiers as authored, in source order.
  pub specifiers: Vec<(String, DependencyKind)>,
  /// Memoized specifier resolutions.
  pub resolved_ids: FxHashMap<String, ModuleId>,
  /// Static dependency targets, in authored order.
  pub dependencies: Vec<ModuleId>,
  /// Dynamic-import targets; each is a chunk boundary.
  pub dyn_dependencies: Vec<ModuleId>,
  pub auxiliary: Vec<AuxiliaryAsset>,
  pub is_user_defined_entry: bool,
  pub is_dynamic_entry: bool,
  pub(crate) exec_order: usize,
}

impl ModuleNode {
  pub fn exec_order(&self) -> usize {
    self.exec_order
  }
}
