use packline_common::{ChunkId, ChunkKind, ModuleId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{path_to_chunk_name, BuildResult, Chunk, ChunkGraph, Graph, InputOptions};

pub(crate) const SHARED_CHUNK_NAME: &str = "shared";

/// First id of the form `base`, `base-1`, `base-2`, ... not already taken.
fn unique_chunk_id(base: &str, taken: &FxHashSet<ChunkId>) -> ChunkId {
  let mut id = ChunkId::new(base);
  let mut n = 1;
  while taken.contains(&id) {
    id = ChunkId::new(format!("{base}-{n}"));
    n += 1;
  }
  id
}

/// Partitions the finished graph into output chunks: one per entry, one
/// shared chunk for modules statically reachable from several entries, and
/// one async chunk per dynamic-import target. Runs single-threaded over the
/// completed graph; chunk content is a function of the graph alone, never
/// of worker arrival order.
pub(crate) struct Chunker<'me> {
  opts: &'me InputOptions,
  graph: &'me Graph,
  entries: Vec<(String, ModuleId)>,
}

impl<'me> Chunker<'me> {
  pub(crate) fn new(graph: &'me Graph, opts: &'me InputOptions) -> Self {
    let entries = opts
      .input
      .iter()
      .map(|item| item.name.clone())
      .zip(graph.entries.iter().cloned())
      .collect();
    Self {
      opts,
      graph,
      entries,
    }
  }

  /// Static-reachability closure from `root`, stopping at (and excluding)
  /// anything in `stop`. Walk order follows authored dependency order, so
  /// the closure content is deterministic.
  fn static_closure(&self, root: &ModuleId, stop: &FxHashMap<ModuleId, ChunkId>) -> Vec<ModuleId> {
    let mut visited: FxHashSet<ModuleId> = Default::default();
    let mut closure = vec![];
    let mut stack = vec![root.clone()];
    while let Some(id) = stack.pop() {
      if visited.contains(&id) || stop.contains_key(&id) {
        continue;
      }
      visited.insert(id.clone());
      closure.push(id.clone());
      let module = &self.graph.module_by_id[&id];
      stack.extend(module.dependencies.iter().rev().cloned());
    }
    closure
  }

  /// Dynamic-import targets as marked by the loader, in execution order.
  /// Collected globally, so async chunks nested under other async chunks
  /// are found without explicit recursion.
  fn dynamic_entries(&self) -> Vec<ModuleId> {
    self
      .graph
      .ordered_modules()
      .iter()
      .filter(|m| m.is_dynamic_entry)
      .map(|m| m.id.clone())
      .collect()
  }

  pub(crate) fn split(self) -> BuildResult<ChunkGraph> {
    let empty_stop: FxHashMap<ModuleId, ChunkId> = Default::default();

    // Entry closures over static edges only.
    let entry_closures: Vec<(String, ModuleId, Vec<ModuleId>)> = self
      .entries
      .iter()
      .map(|(name, id)| (name.clone(), id.clone(), self.static_closure(id, &empty_stop)))
      .collect();

    // Modules statically reachable from two or more distinct entry
    // closures are hoisted into exactly one shared chunk. Entry roots
    // themselves always stay in their own chunk.
    let entry_roots: FxHashSet<&ModuleId> = self.entries.iter().map(|(_, id)| id).collect();
    let mut closure_count: FxHashMap<&ModuleId, usize> = Default::default();
    for (_, _, closure) in &entry_closures {
      for id in closure {
        *closure_count.entry(id).or_default() += 1;
      }
    }
    let hoisted: FxHashSet<ModuleId> = closure_count
      .into_iter()
      .filter(|(id, count)| *count >= 2 && !entry_roots.contains(id))
      .map(|(id, _)| id.clone())
      .collect();

    let mut chunks: Vec<Chunk> = vec![];
    let mut assigned: FxHashMap<ModuleId, ChunkId> = Default::default();
    let mut split_point_to_chunk: FxHashMap<ModuleId, ChunkId> = Default::default();

    // Entry roots always live in their own chunk, even when another entry
    // reaches them statically.
    for (name, id) in &self.entries {
      assigned.insert(id.clone(), ChunkId::new(name.as_str()));
    }

    // Entry names are claimed first; the hoisted chunk and async chunks
    // rename themselves rather than collide with an entry that happens to
    // be called "shared" (or shadow each other).
    let mut taken_ids: FxHashSet<ChunkId> = self
      .entries
      .iter()
      .map(|(name, _)| ChunkId::new(name.as_str()))
      .collect();
    let shared_id = unique_chunk_id(SHARED_CHUNK_NAME, &taken_ids);
    if !hoisted.is_empty() {
      taken_ids.insert(shared_id.clone());
    }

    for (name, entry_id, closure) in entry_closures {
      let mut chunk = Chunk::new(name.as_str(), ChunkKind::Entry, Some(entry_id.clone()));
      chunk.modules.insert(entry_id.clone());
      let mut uses_shared = false;
      for id in closure {
        if id == entry_id {
          continue;
        }
        if hoisted.contains(&id) {
          uses_shared = true;
        } else if !assigned.contains_key(&id) {
          assigned.insert(id.clone(), chunk.id.clone());
          chunk.modules.insert(id);
        }
      }
      if uses_shared {
        chunk.requires.push(shared_id.clone());
      }
      split_point_to_chunk.insert(entry_id, chunk.id.clone());
      chunks.push(chunk);
    }

    if !hoisted.is_empty() {
      let mut chunk = Chunk::new(shared_id, ChunkKind::Shared, None);
      for id in &hoisted {
        assigned.insert(id.clone(), chunk.id.clone());
      }
      chunk.modules.extend(hoisted);
      chunks.push(chunk);
    }

    // Each dynamic edge target roots its own async chunk, computed over
    // the remaining graph: modules already owned by an entry, shared or
    // earlier async chunk are referenced, not duplicated.
    let cwd = self.opts.cwd.to_string_lossy();
    for dynamic_entry in self.dynamic_entries() {
      if let Some(owner) = assigned.get(&dynamic_entry) {
        // Degenerate boundary: the target is already statically owned
        // elsewhere, so the dynamic edge just references that chunk.
        split_point_to_chunk.insert(dynamic_entry, owner.clone());
        continue;
      }

      let id = unique_chunk_id(&path_to_chunk_name(&cwd, dynamic_entry.path()), &taken_ids);
      let mut chunk = Chunk::new(id, ChunkKind::Async, Some(dynamic_entry.clone()));
      for id in self.static_closure(&dynamic_entry, &assigned) {
        assigned.insert(id.clone(), chunk.id.clone());
        chunk.modules.insert(id);
      }
      split_point_to_chunk.insert(dynamic_entry, chunk.id.clone());
      taken_ids.insert(chunk.id.clone());
      chunks.push(chunk);
    }

    tracing::trace!(
      "chunks: {:?}",
      chunks
        .iter()
        .map(|c| (c.id.clone(), c.modules.len()))
        .collect::<Vec<_>>()
    );

    Ok(ChunkGraph {
      chunks,
      split_point_to_chunk,
    })
  }
}
