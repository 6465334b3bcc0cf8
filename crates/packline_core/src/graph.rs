use std::sync::Arc;

use itertools::Itertools;
use packline_common::ModuleId;
use packline_plugin::Hooks;
use rustc_hash::FxHashSet;

use crate::module_loader::ModuleLoader;
use crate::{
  BuildCache, BuildResult, InputOptions, ModuleById, ModuleNode, SharedResolver,
  TransformDispatcher,
};

#[derive(Debug, Default)]
pub struct Graph {
  pub entries: Vec<ModuleId>,
  pub(crate) module_by_id: ModuleById,
  pub(crate) cache_hits: usize,
}

impl Graph {
  pub(crate) fn new() -> Self {
    Default::default()
  }

  pub(crate) fn add_module(&mut self, module: ModuleNode) {
    debug_assert!(!self.module_by_id.contains_key(&module.id));
    self.module_by_id.insert(module.id.clone(), module);
  }

  pub fn module(&self, id: &ModuleId) -> Option<&ModuleNode> {
    self.module_by_id.get(id)
  }

  pub fn len(&self) -> usize {
    self.module_by_id.len()
  }

  pub fn is_empty(&self) -> bool {
    self.module_by_id.is_empty()
  }

  /// Modules in deterministic execution order.
  pub fn ordered_modules(&self) -> Vec<&ModuleNode> {
    self
      .module_by_id
      .values()
      .sorted_by_key(|m| m.exec_order())
      .collect()
  }

  /// Assigns every module an execution order: dependencies before
  /// dependents, statically-reached modules before dynamically-reached
  /// ones. Cycles are tolerated; a revisited module is simply not
  /// re-entered, so each module gets exactly one order.
  #[tracing::instrument(skip_all)]
  fn sort_modules(&mut self) {
    enum Action {
      Enter,
      Exit,
    }
    type Queue = Vec<(Action, ModuleId)>;
    let mut queue = self
      .entries
      .iter()
      .map(|id| (Action::Enter, id.clone()))
      .rev()
      .collect::<Vec<_>>();

    let mut entered_ids: FxHashSet<ModuleId> = FxHashSet::default();
    let mut next_exec_order = 0;
    let mut dynamic_entries: Queue = vec![];

    let mut walk = |queue: &mut Queue, mut dynamic_entries: Option<&mut Queue>| {
      while let Some((action, id)) = queue.pop() {
        match action {
          Action::Enter => {
            if !entered_ids.contains(&id) {
              entered_ids.insert(id.clone());
              let module = &self.module_by_id[&id];
              queue.push((Action::Exit, id.clone()));
              module
                .dependencies
                .iter()
                .rev()
                .filter(|dep| !entered_ids.contains(*dep))
                .for_each(|dep| {
                  queue.push((Action::Enter, dep.clone()));
                });
              if let Some(dynamic_entries) = dynamic_entries.as_mut() {
                module
                  .dyn_dependencies
                  .iter()
                  .filter(|dep| !entered_ids.contains(*dep))
                  .for_each(|dep| {
                    dynamic_entries.push((Action::Enter, dep.clone()));
                  });
              }
            }
          }
          Action::Exit => {
            self
              .module_by_id
              .get_mut(&id)
              .expect("exited module must be in the graph")
              .exec_order = next_exec_order;
            next_exec_order += 1;
          }
        }
      }
    };

    walk(&mut queue, Some(&mut dynamic_entries));
    walk(&mut dynamic_entries, None);

    tracing::debug!(
      "sorted modules {:?}",
      self
        .module_by_id
        .values()
        .sorted_by_key(|m| m.exec_order())
        .map(|m| m.id.to_string())
        .collect_vec()
    );
  }

  pub(crate) async fn build(
    &mut self,
    input_opts: &InputOptions,
    dispatcher: Arc<TransformDispatcher>,
    resolver: SharedResolver,
    cache: Arc<BuildCache>,
    hooks: Arc<Hooks>,
  ) -> BuildResult<()> {
    ModuleLoader::new(self, dispatcher, resolver, cache, hooks, input_opts)
      .fetch_all_modules()
      .await?;

    self.sort_modules();
    Ok(())
  }
}
