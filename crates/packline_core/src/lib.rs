use std::sync::Arc;

mod bundler;
pub use bundler::*;
mod builtin_stages;
pub use builtin_stages::*;
mod cache;
pub use cache::*;
mod chunk;
pub use chunk::*;
mod chunk_graph;
pub(crate) use chunk_graph::*;
mod chunker;
pub(crate) use chunker::*;
mod emit;
pub use emit::*;
mod graph;
pub use graph::*;
mod manifest;
pub use manifest::*;
mod module;
pub use module::*;
mod module_loader;
mod options;
pub use options::*;
mod scan;
pub(crate) use scan::*;
mod transform;
pub use transform::*;
mod utils;
pub use utils::*;

use packline_common::ModuleId;
use packline_resolver::Resolver;
use rustc_hash::FxHashMap;

pub(crate) type ModuleById = FxHashMap<ModuleId, ModuleNode>;
pub(crate) type SharedResolver = Arc<Resolver>;

pub type BuildResult<T> = packline_error::Result<T>;
pub type BuildError = packline_error::Error;
pub type WarningHandler = Arc<dyn Fn(&BuildError) + Send + Sync>;
