use std::sync::Arc;

use packline_plugin::{BuildChannel, BuildCompleted, Hooks, OptimizeStage};
use packline_resolver::{FsSnapshot, Resolver};
use tokio::sync::broadcast;

use crate::{
  default_optimizers, BuildCache, BuildError, BuildOutput, BuildResult, Chunker, Emitter, Graph,
  InputOptions, OutputOptions, TransformDispatcher,
};

/// The pipeline facade. Construction validates the configuration and
/// compiles the rule set, so every configuration error surfaces before a
/// single module is read. A bundler is reusable: repeated `build` calls
/// share the transform cache, which is what makes rebuilds incremental.
pub struct Bundler {
  input_options: InputOptions,
  dispatcher: Arc<TransformDispatcher>,
  cache: Arc<BuildCache>,
  optimizers: Vec<Arc<dyn OptimizeStage>>,
  hooks: Arc<Hooks>,
  channel: BuildChannel,
}

impl Bundler {
  pub fn new(input_options: InputOptions) -> BuildResult<Self> {
    packline_tracing::init();
    input_options.validate()?;
    let dispatcher = Arc::new(TransformDispatcher::compile(&input_options)?);
    Ok(Self {
      input_options,
      dispatcher,
      cache: Arc::new(BuildCache::default()),
      optimizers: default_optimizers(),
      hooks: Arc::new(Hooks::default()),
      channel: BuildChannel::default(),
    })
  }

  pub fn with_hooks(mut self, hooks: Hooks) -> Self {
    self.hooks = Arc::new(hooks);
    self
  }

  /// Replaces the production pass list. Order is preserved as given.
  pub fn with_optimizers(mut self, optimizers: Vec<Arc<dyn OptimizeStage>>) -> Self {
    self.optimizers = optimizers;
    self
  }

  /// Completion notifications for external observers (dev servers).
  pub fn subscribe(&self) -> broadcast::Receiver<BuildCompleted> {
    self.channel.subscribe()
  }

  pub fn cache_len(&self) -> usize {
    self.cache.len()
  }

  #[tracing::instrument(skip_all)]
  pub async fn build(&mut self, output_options: OutputOptions) -> BuildResult<BuildOutput> {
    output_options.validate()?;

    // Resolution for this whole build happens against one snapshot.
    let snapshot = FsSnapshot::capture(&self.input_options.cwd).map_err(|e| {
      BuildError::io_error(e).context(format!(
        "snapshot {}",
        self.input_options.cwd.display()
      ))
    })?;
    let resolver = Arc::new(Resolver::new(
      self.input_options.cwd.clone(),
      self.input_options.resolve_extensions.clone(),
      snapshot,
    ));

    let mut graph = Graph::new();
    graph
      .build(
        &self.input_options,
        self.dispatcher.clone(),
        resolver,
        self.cache.clone(),
        self.hooks.clone(),
      )
      .await?;

    let chunk_graph = Chunker::new(&graph, &self.input_options).split()?;

    let output = Emitter::new(
      &graph,
      &chunk_graph,
      &self.input_options,
      &output_options,
      &self.optimizers,
      &self.hooks,
    )
    .emit()?;

    self.channel.notify(output.manifest.to_json());
    tracing::debug!(
      modules = output.stats.modules,
      cache_hits = output.stats.cache_hits,
      assets = output.assets.len(),
      "build finished"
    );
    Ok(output)
  }
}
