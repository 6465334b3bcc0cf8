use globset::{Glob, GlobMatcher};
use packline_common::{Content, DependencyKind, FileClass, Mode, ModuleId};
use packline_plugin::{AuxiliaryAsset, TransformArgs};
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::{scan_specifiers, BuildError, BuildResult, InputOptions, TransformRule};

#[derive(Debug)]
struct CompiledRule {
  pattern: String,
  matcher: GlobMatcher,
  stages: Vec<Arc<dyn packline_plugin::TransformStage>>,
  chained: bool,
}

/// Result of running a module through its matched stage chain.
#[derive(Debug)]
pub struct TransformedModule {
  pub content: Content,
  /// Dependency specifiers as authored, in source order.
  pub specifiers: Vec<(String, DependencyKind)>,
  pub auxiliary: Vec<AuxiliaryAsset>,
}

/// Selects and runs the ordered stage chain whose match rule applies to a
/// module. Rule compilation happens once, before any module is read, so a
/// malformed rule surfaces as a `ConfigurationError` up front.
#[derive(Debug)]
pub struct TransformDispatcher {
  rules: Vec<CompiledRule>,
  mode: Mode,
  env: FxHashMap<String, String>,
}

impl TransformDispatcher {
  pub fn compile(opts: &InputOptions) -> BuildResult<Self> {
    let rules = opts
      .rules
      .iter()
      .map(|rule| Self::compile_rule(rule))
      .collect::<BuildResult<Vec<_>>>()?;

    let env = opts
      .env_passthrough
      .iter()
      .filter_map(|name| std::env::var(name).ok().map(|value| (name.clone(), value)))
      .collect();

    Ok(Self {
      rules,
      mode: opts.mode,
      env,
    })
  }

  fn compile_rule(rule: &TransformRule) -> BuildResult<CompiledRule> {
    if rule.stages.is_empty() {
      return Err(BuildError::configuration(format!(
        "rule \"{}\" has an empty stage chain",
        rule.pattern
      )));
    }
    let matcher = Glob::new(&rule.pattern)
      .map_err(|e| {
        BuildError::configuration(format!("invalid rule pattern \"{}\": {e}", rule.pattern))
      })?
      .compile_matcher();
    Ok(CompiledRule {
      pattern: rule.pattern.clone(),
      matcher,
      stages: rule.stages.clone(),
      chained: rule.chained,
    })
  }

  /// First matching pattern wins; rules are mutually exclusive by contract.
  fn matched_rule(&self, id: &ModuleId) -> Option<&CompiledRule> {
    self
      .rules
      .iter()
      .find(|rule| rule.matcher.is_match(id.path()))
  }

  /// Part of a module's incremental-cache key: the matched rule's stage set
  /// and ordering, not the source digest alone. A configuration change must
  /// invalidate cached transforms even for unchanged sources.
  pub fn stage_cache_key(&self, id: &ModuleId, class: FileClass) -> String {
    if class.is_binary() {
      return "passthrough".to_string();
    }
    match self.matched_rule(id) {
      Some(rule) => {
        let stages = rule
          .stages
          .iter()
          .map(|stage| stage.name().into_owned())
          .collect::<Vec<_>>()
          .join(">");
        crate::content_digest(
          format!("{}|{}|chained={}", rule.pattern, stages, rule.chained).as_bytes(),
        )
      }
      None => "unmatched".to_string(),
    }
  }

  #[tracing::instrument(skip_all, fields(id = %id))]
  pub async fn transform(
    &self,
    id: &ModuleId,
    class: FileClass,
    raw: Content,
  ) -> BuildResult<TransformedModule> {
    // Binary assets bypass content transformation entirely.
    if class.is_binary() {
      return Ok(TransformedModule {
        content: raw,
        specifiers: vec![],
        auxiliary: vec![],
      });
    }

    let mut content = raw;
    let mut auxiliary = vec![];

    if let Some(rule) = self.matched_rule(id) {
      tracing::trace!("rule \"{}\" matched {}", rule.pattern, id);
      let stages: Vec<_> = if rule.chained {
        rule.stages.iter().rev().collect()
      } else {
        rule.stages.iter().collect()
      };
      for stage in stages {
        let args = TransformArgs {
          id,
          content: &content,
          mode: self.mode,
          env: &self.env,
        };
        let output = stage.apply(args).await.map_err(|cause| {
          BuildError::transform_failed(id.path(), stage.name().into_owned(), cause)
        })?;
        if let Some(transformed) = output {
          content = transformed.content;
          auxiliary.extend(transformed.auxiliary);
        }
      }
    }

    let specifiers = match content.as_text() {
      Some(text) => scan_specifiers(text, class),
      None => vec![],
    };

    Ok(TransformedModule {
      content,
      specifiers,
      auxiliary,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::InputItem;
  use packline_plugin::{TransformStage, TransformStageOutput, TransformedContent};

  #[derive(Debug)]
  struct Tag(&'static str);

  #[async_trait::async_trait]
  impl TransformStage for Tag {
    fn name(&self) -> packline_plugin::StageName {
      self.0.into()
    }

    async fn apply(&self, args: TransformArgs<'_>) -> TransformStageOutput {
      let text = args.content.as_text().unwrap_or_default();
      Ok(Some(TransformedContent::new(Content::Text(format!(
        "{text}|{}",
        self.0
      )))))
    }
  }

  fn opts(rules: Vec<TransformRule>) -> InputOptions {
    InputOptions {
      input: vec![InputItem::new("app", "src/index.js")],
      rules,
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn first_matching_rule_wins() {
    let dispatcher = TransformDispatcher::compile(&opts(vec![
      TransformRule::new("**/*.js", vec![Arc::new(Tag("first"))]),
      TransformRule::new("**/*", vec![Arc::new(Tag("second"))]),
    ]))
    .unwrap();

    let id = ModuleId::new("/app/src/index.js");
    let out = dispatcher
      .transform(&id, FileClass::Script, Content::Text("src".into()))
      .await
      .unwrap();
    assert_eq!(out.content.as_text().unwrap(), "src|first");
  }

  #[tokio::test]
  async fn chained_rule_runs_stages_in_reverse_declaration_order() {
    let stages: Vec<Arc<dyn TransformStage>> = vec![Arc::new(Tag("outer")), Arc::new(Tag("inner"))];
    let dispatcher =
      TransformDispatcher::compile(&opts(vec![TransformRule::new("**/*.css", stages).chained()]))
        .unwrap();

    let id = ModuleId::new("/app/src/app.css");
    let out = dispatcher
      .transform(&id, FileClass::Style, Content::Text("src".into()))
      .await
      .unwrap();
    // Last-declared stage sees the raw input first.
    assert_eq!(out.content.as_text().unwrap(), "src|inner|outer");
  }

  #[tokio::test]
  async fn binary_modules_bypass_stages() {
    let dispatcher = TransformDispatcher::compile(&opts(vec![TransformRule::new(
      "**/*",
      vec![Arc::new(Tag("any"))],
    )]))
    .unwrap();

    let id = ModuleId::new("/app/src/logo.png");
    let bytes = vec![0x89, 0x50, 0x4e, 0x47];
    let out = dispatcher
      .transform(&id, FileClass::Binary, Content::Bytes(bytes.clone()))
      .await
      .unwrap();
    assert_eq!(out.content.as_bytes(), bytes.as_slice());
    assert!(out.specifiers.is_empty());
  }

  #[test]
  fn empty_stage_chain_is_a_configuration_error() {
    let err = TransformDispatcher::compile(&opts(vec![TransformRule::new("**/*.js", vec![])]))
      .unwrap_err();
    assert_eq!(err.code(), "INVALID_CONFIG");
  }

  #[test]
  fn stage_key_tracks_rule_configuration() {
    let a = TransformDispatcher::compile(&opts(vec![TransformRule::new(
      "**/*.js",
      vec![Arc::new(Tag("one"))],
    )]))
    .unwrap();
    let b = TransformDispatcher::compile(&opts(vec![TransformRule::new(
      "**/*.js",
      vec![Arc::new(Tag("two"))],
    )]))
    .unwrap();

    let id = ModuleId::new("/app/src/index.js");
    assert_ne!(
      a.stage_cache_key(&id, FileClass::Script),
      b.stage_cache_key(&id, FileClass::Script)
    );
  }
}
