use std::sync::Arc;

use packline_common::{Content, DependencyKind, FileClass, Mode, ModuleId};
use packline_plugin::Hooks;
use rustc_hash::FxHashMap;
use tracing::instrument;

use super::Msg;
use crate::{
  content_digest, BuildCache, BuildError, BuildResult, CachedTransform, ModuleNode,
  SharedResolver, TransformDispatcher, TransformedModule, WarningHandler,
};

pub(crate) struct ModuleTask {
  pub(crate) id: ModuleId,
  pub(crate) is_user_defined_entry: bool,
  pub(crate) tx: tokio::sync::mpsc::UnboundedSender<Msg>,
  pub(crate) dispatcher: Arc<TransformDispatcher>,
  pub(crate) resolver: SharedResolver,
  pub(crate) cache: Arc<BuildCache>,
  pub(crate) hooks: Arc<Hooks>,
  pub(crate) mode: Mode,
  pub(crate) on_warn: WarningHandler,
}

#[derive(Debug)]
pub(crate) struct TaskResult {
  pub module: ModuleNode,
  pub cache_hit: bool,
}

impl ModuleTask {
  #[instrument(skip_all, fields(id = %self.id))]
  pub(crate) async fn run(self) {
    let tx = self.tx.clone();
    match self.run_inner().await {
      Ok(result) => {
        // The coordinator outliving its tasks is an invariant of the
        // loader's remaining-task accounting.
        tx.send(Msg::Built(result)).expect("coordinator is alive");
      }
      Err(err) => {
        tx.send(Msg::Error(err)).expect("coordinator is alive");
      }
    }
  }

  async fn run_inner(self) -> BuildResult<TaskResult> {
    let raw = tokio::fs::read(self.id.as_path())
      .await
      .map_err(|e| BuildError::io_error(e).context(format!("read file: {}", self.id)))?;

    let class = FileClass::from_path(self.id.as_path());
    let source_digest = content_digest(&raw);
    let stage_key = self.dispatcher.stage_cache_key(&self.id, class);

    if let Some(cached) = self.cache.get_valid(&self.id, &source_digest, &stage_key) {
      tracing::trace!("cache hit: {}", self.id);
      let (resolved_ids, dependencies, dyn_dependencies) =
        self.resolve_specifiers(&cached.specifiers)?;
      return Ok(TaskResult {
        module: ModuleNode {
          id: self.id,
          class,
          source_digest,
          stage_key,
          content: cached.content,
          specifiers: cached.specifiers,
          resolved_ids,
          dependencies,
          dyn_dependencies,
          auxiliary: cached.auxiliary,
          is_user_defined_entry: self.is_user_defined_entry,
          is_dynamic_entry: false,
          exec_order: usize::MAX,
        },
        cache_hit: true,
      });
    }

    let content = if class.is_binary() {
      Content::Bytes(raw)
    } else {
      Content::Text(String::from_utf8_lossy(&raw).into_owned())
    };

    self.hooks.run_pre_transform(&self.id);
    let transformed = match self.dispatcher.transform(&self.id, class, content).await {
      Ok(transformed) => {
        // Only clean transforms are worth carrying across builds.
        self.cache.store(
          self.id.clone(),
          CachedTransform {
            source_digest: source_digest.clone(),
            stage_key: stage_key.clone(),
            class,
            content: transformed.content.clone(),
            specifiers: transformed.specifiers.clone(),
            auxiliary: transformed.auxiliary.clone(),
          },
        );
        transformed
      }
      Err(err) if !self.mode.bails() => {
        (self.on_warn)(&err);
        TransformedModule {
          content: Content::Text(format!("/* packline: failed to transform {}: {err} */", self.id)),
          specifiers: vec![],
          auxiliary: vec![],
        }
      }
      Err(err) => return Err(err),
    };
    self.hooks.run_post_transform(&self.id);

    let (resolved_ids, dependencies, dyn_dependencies) =
      self.resolve_specifiers(&transformed.specifiers)?;

    Ok(TaskResult {
      module: ModuleNode {
        id: self.id,
        class,
        source_digest,
        stage_key,
        content: transformed.content,
        specifiers: transformed.specifiers,
        resolved_ids,
        dependencies,
        dyn_dependencies,
        auxiliary: transformed.auxiliary,
        is_user_defined_entry: self.is_user_defined_entry,
        is_dynamic_entry: false,
        exec_order: usize::MAX,
      },
      cache_hit: false,
    })
  }

  /// Resolution is memoized per module and redone each build against the
  /// current filesystem snapshot. An unresolvable specifier loses only the
  /// edge in development mode and fails the build in production mode.
  fn resolve_specifiers(
    &self,
    specifiers: &[(String, DependencyKind)],
  ) -> BuildResult<(FxHashMap<String, ModuleId>, Vec<ModuleId>, Vec<ModuleId>)> {
    let mut resolved_ids = FxHashMap::default();
    let mut dependencies = vec![];
    let mut dyn_dependencies = vec![];

    for (specifier, kind) in specifiers {
      let resolved = match self.resolver.resolve(Some(self.id.path()), specifier) {
        Ok(resolved) => ModuleId::new(resolved),
        Err(err) if !self.mode.bails() => {
          (self.on_warn)(&err);
          continue;
        }
        Err(err) => return Err(err),
      };
      resolved_ids.insert(specifier.clone(), resolved.clone());
      match kind {
        DependencyKind::Static => {
          if !dependencies.contains(&resolved) {
            dependencies.push(resolved);
          }
        }
        DependencyKind::DynamicAsync => {
          if !dyn_dependencies.contains(&resolved) {
            dyn_dependencies.push(resolved);
          }
        }
      }
    }

    Ok((resolved_ids, dependencies, dyn_dependencies))
  }
}
