use packline_common::{ChunkId, ModuleId};
use rustc_hash::FxHashMap;

use crate::Chunk;

/// The chunker's output. `chunks` is in deterministic order: entry chunks
/// in declaration order, then the shared chunk, then async chunks in
/// execution order of their split points.
#[derive(Debug)]
pub(crate) struct ChunkGraph {
  pub(crate) chunks: Vec<Chunk>,
  pub(crate) split_point_to_chunk: FxHashMap<ModuleId, ChunkId>,
}
