use std::collections::HashSet;
use std::sync::Arc;

use packline_common::ModuleId;
use packline_plugin::Hooks;
use rustc_hash::FxHashSet;

pub(crate) mod module_task;

use module_task::{ModuleTask, TaskResult};

use crate::{
  BuildCache, BuildError, BuildResult, Graph, InputOptions, SharedResolver, TransformDispatcher,
};

/// Drives graph construction: a coordinator loop that spawns one task per
/// newly discovered module identity and folds finished tasks back into the
/// graph. The coordinator is the single consumer of the claim set, so each
/// identity is enqueued at most once no matter how many tasks discover it
/// concurrently.
pub(crate) struct ModuleLoader<'a> {
  input_options: &'a InputOptions,
  graph: &'a mut Graph,
  dispatcher: Arc<TransformDispatcher>,
  resolver: SharedResolver,
  cache: Arc<BuildCache>,
  hooks: Arc<Hooks>,
  loaded_modules: HashSet<ModuleId>,
  remaining_tasks: usize,
  tx: tokio::sync::mpsc::UnboundedSender<Msg>,
  rx: tokio::sync::mpsc::UnboundedReceiver<Msg>,
  errors: Vec<BuildError>,
  dynamic_imported_modules: FxHashSet<ModuleId>,
}

#[derive(Debug)]
pub(crate) enum Msg {
  Built(TaskResult),
  Error(BuildError),
}

impl<'a> ModuleLoader<'a> {
  pub(crate) fn new(
    graph: &'a mut Graph,
    dispatcher: Arc<TransformDispatcher>,
    resolver: SharedResolver,
    cache: Arc<BuildCache>,
    hooks: Arc<Hooks>,
    input_opts: &'a InputOptions,
  ) -> Self {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Msg>();
    Self {
      graph,
      dispatcher,
      resolver,
      cache,
      hooks,
      loaded_modules: Default::default(),
      remaining_tasks: 0,
      tx,
      rx,
      errors: Default::default(),
      dynamic_imported_modules: Default::default(),
      input_options: input_opts,
    }
  }

  fn resolve_entries(&self) -> BuildResult<Vec<ModuleId>> {
    self
      .input_options
      .input
      .iter()
      .map(|item| {
        self
          .resolver
          .resolve(None, &item.import)
          .map(ModuleId::new)
          .map_err(|_| BuildError::unresolved_entry(&item.import))
      })
      .collect()
  }

  pub(crate) async fn fetch_all_modules(mut self) -> BuildResult<()> {
    if self.input_options.input.is_empty() {
      return Err(BuildError::configuration("at least one entry is required"));
    }

    let resolved_entries = self.resolve_entries()?;

    for id in resolved_entries {
      if self.loaded_modules.insert(id.clone()) {
        self.spawn_new_module_task(id.clone(), true);
      }
      self.graph.entries.push(id);
    }

    while self.remaining_tasks > 0 {
      let msg = self.rx.recv().await.expect("sender is alive");
      match msg {
        Msg::Built(result) => {
          tracing::trace!("finish: {}", result.module.id);
          self.remaining_tasks -= 1;
          self.handle_msg_built(result);
        }
        Msg::Error(err) => {
          self.remaining_tasks -= 1;
          self.errors.push(err);
        }
      }
      tracing::trace!("remaining: {}", self.remaining_tasks);
    }

    self.mark_dynamic_imported_modules();

    if self.errors.is_empty() {
      Ok(())
    } else {
      Err(self.errors.remove(0))
    }
  }

  fn mark_dynamic_imported_modules(&mut self) {
    self.dynamic_imported_modules.iter().for_each(|id| {
      if let Some(module) = self.graph.module_by_id.get_mut(id) {
        module.is_dynamic_entry = true;
      }
    });
  }

  fn spawn_new_module_task(&mut self, module_id: ModuleId, is_user_defined_entry: bool) {
    tracing::trace!("spawning new job for {}", module_id);
    self.remaining_tasks += 1;
    let task = ModuleTask {
      id: module_id,
      is_user_defined_entry,
      tx: self.tx.clone(),
      dispatcher: self.dispatcher.clone(),
      resolver: self.resolver.clone(),
      cache: self.cache.clone(),
      hooks: self.hooks.clone(),
      mode: self.input_options.mode,
      on_warn: self.input_options.on_warn.clone(),
    };
    tokio::spawn(task.run());
  }

  fn handle_msg_built(&mut self, result: TaskResult) {
    let TaskResult { module, cache_hit } = result;

    if cache_hit {
      self.graph.cache_hits += 1;
    }

    // Production mode bails: once an error is recorded, stop claiming new
    // identities and let in-flight tasks drain. Their output is discarded
    // with the rest of the partial build.
    let bailing = self.input_options.mode.bails() && !self.errors.is_empty();

    if !bailing {
      for id in module.dependencies.iter().chain(module.dyn_dependencies.iter()) {
        if self.loaded_modules.insert(id.clone()) {
          self.spawn_new_module_task(id.clone(), false);
        }
      }
    }

    self
      .dynamic_imported_modules
      .extend(module.dyn_dependencies.iter().cloned());

    // A dependency chain that revisits an identity already claimed (in
    // progress or finished) records only the edge; traversal never
    // re-enters, which makes static cycles legal.
    self.graph.add_module(module);
  }
}
