use itertools::Itertools;
use packline_common::{ChunkId, ChunkKind, FileClass, Mode, ModuleId};
use rustc_hash::FxHashSet;

use crate::{ModuleById, ModuleNode};

/// A group of modules destined for one physical output asset (plus an
/// optional sibling stylesheet in production mode).
#[derive(Debug)]
pub struct Chunk {
  pub id: ChunkId,
  pub kind: ChunkKind,
  /// The split-point module this chunk was grown from. `None` for the
  /// shared chunk, which has no single root.
  pub entry: Option<ModuleId>,
  pub(crate) modules: FxHashSet<ModuleId>,
  /// Chunks that must be loaded before this one (the shared chunk, for
  /// entry chunks whose closure was partially hoisted into it).
  pub(crate) requires: Vec<ChunkId>,
}

impl Chunk {
  pub(crate) fn new(id: impl Into<ChunkId>, kind: ChunkKind, entry: Option<ModuleId>) -> Self {
    Self {
      id: id.into(),
      kind,
      entry,
      modules: Default::default(),
      requires: vec![],
    }
  }

  /// Chunk-internal module order: the deterministic topological order
  /// assigned at graph time (dependencies before dependents), never
  /// arrival order.
  pub(crate) fn ordered_modules<'m>(&self, module_by_id: &'m ModuleById) -> Vec<&'m ModuleNode> {
    self
      .modules
      .iter()
      .map(|id| &module_by_id[id])
      .sorted_by_key(|m| m.exec_order())
      .collect()
  }

  /// Concatenates the chunk's text modules. In development mode style
  /// content stays inline in the script output; in production mode it is
  /// split out for extraction into a sibling stylesheet asset.
  pub(crate) fn render(&self, module_by_id: &ModuleById, mode: Mode) -> RenderedChunk {
    let mut script_parts: Vec<&str> = vec![];
    let mut style_parts: Vec<&str> = vec![];
    let mut inline_styles: Vec<String> = vec![];

    for module in self.ordered_modules(module_by_id) {
      let Some(text) = module.content.as_text() else {
        // Binary assets are emitted as standalone files, never inlined.
        continue;
      };
      match module.class {
        FileClass::Style if mode.is_production() => style_parts.push(text),
        FileClass::Style => {
          inline_styles.push(format!(
            "__packline_inject_style({});",
            serde_json::to_string(text).expect("strings always serialize")
          ));
        }
        FileClass::Script | FileClass::Markup | FileClass::Binary => script_parts.push(text),
      }
    }

    let mut script = script_parts.join("\n");
    if !inline_styles.is_empty() {
      if !script.is_empty() {
        script.push('\n');
      }
      script.push_str(&inline_styles.join("\n"));
    }

    RenderedChunk {
      script,
      style: (!style_parts.is_empty()).then(|| style_parts.join("\n")),
    }
  }
}

#[derive(Debug)]
pub(crate) struct RenderedChunk {
  pub script: String,
  pub style: Option<String>,
}
