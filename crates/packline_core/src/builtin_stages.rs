use std::sync::Arc;

use itertools::Itertools;
use packline_common::{AssetCategory, Content};
use packline_plugin::{
  OptimizeArgs, OptimizeStage, OptimizeStageOutput, StageName, TransformArgs, TransformStage,
  TransformStageOutput, TransformedContent,
};

use crate::TransformRule;

/// A stage that forwards content unchanged. Default rules register these
/// under the names the host application's real transpilers would take, so a
/// configuration can swap them out rule-by-rule without reshuffling keys.
#[derive(Debug)]
pub struct PassthroughStage {
  name: &'static str,
}

impl PassthroughStage {
  pub fn new(name: &'static str) -> Self {
    Self { name }
  }
}

#[async_trait::async_trait]
impl TransformStage for PassthroughStage {
  fn name(&self) -> StageName {
    self.name.into()
  }

  async fn apply(&self, _args: TransformArgs<'_>) -> TransformStageOutput {
    Ok(None)
  }
}

/// Substitutes `process.env.NAME` occurrences with the configured value,
/// serialized as a string literal. Only names in the passthrough list reach
/// the stage at all.
#[derive(Debug)]
pub struct EnvReplaceStage;

#[async_trait::async_trait]
impl TransformStage for EnvReplaceStage {
  fn name(&self) -> StageName {
    "env-replace".into()
  }

  async fn apply(&self, args: TransformArgs<'_>) -> TransformStageOutput {
    let Some(text) = args.content.as_text() else {
      return Ok(None);
    };
    if args.env.is_empty() {
      return Ok(None);
    }
    let mut replaced = text.to_string();
    // Key-sorted iteration keeps the substitution order stable.
    for key in args.env.keys().sorted() {
      let literal = serde_json::to_string(&args.env[key])?;
      replaced = replaced.replace(&format!("process.env.{key}"), &literal);
    }
    if replaced == text {
      return Ok(None);
    }
    Ok(Some(TransformedContent::new(Content::Text(replaced))))
  }
}

/// Default rule set, first match wins: styles through a chained loader pair,
/// typed scripts through a transpiler slot, plain scripts through env
/// substitution only. Binary files never reach a rule.
pub fn default_rules() -> Vec<TransformRule> {
  vec![
    TransformRule::new(
      "**/*.{css,scss,sass}",
      vec![
        Arc::new(PassthroughStage::new("style")),
        Arc::new(PassthroughStage::new("postcss")),
      ],
    )
    .chained(),
    TransformRule::new(
      "**/*.{ts,tsx}",
      vec![
        Arc::new(PassthroughStage::new("typescript")),
        Arc::new(EnvReplaceStage),
      ],
    ),
    TransformRule::new("**/*.{js,jsx,mjs}", vec![Arc::new(EnvReplaceStage)]),
  ]
}

/// Whitespace-level script minifier: drops blank lines and trailing spaces.
/// Token-level minification belongs to an external stage.
#[derive(Debug)]
pub struct ScriptMinifier;

impl OptimizeStage for ScriptMinifier {
  fn name(&self) -> StageName {
    "script-minify".into()
  }

  fn applies_to(&self, category: AssetCategory) -> bool {
    category == AssetCategory::Script
  }

  fn apply(&self, args: OptimizeArgs<'_>) -> OptimizeStageOutput {
    let text = std::str::from_utf8(args.bytes)?;
    let minified = text
      .lines()
      .map(str::trim_end)
      .filter(|line| !line.is_empty())
      .join("\n");
    if minified == text {
      return Ok(None);
    }
    Ok(Some(minified.into_bytes()))
  }
}

/// Strips comments and collapses whitespace in stylesheet output.
#[derive(Debug)]
pub struct StyleMinifier;

impl OptimizeStage for StyleMinifier {
  fn name(&self) -> StageName {
    "style-minify".into()
  }

  fn applies_to(&self, category: AssetCategory) -> bool {
    category == AssetCategory::Style
  }

  fn apply(&self, args: OptimizeArgs<'_>) -> OptimizeStageOutput {
    let text = std::str::from_utf8(args.bytes)?;

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut pending_space = false;
    while let Some(c) = chars.next() {
      if c == '/' && chars.peek() == Some(&'*') {
        chars.next();
        while let Some(c) = chars.next() {
          if c == '*' && chars.peek() == Some(&'/') {
            chars.next();
            break;
          }
        }
        continue;
      }
      if c.is_whitespace() {
        pending_space = true;
        continue;
      }
      let boundary = matches!(c, '{' | '}' | ';' | ':' | ',');
      if pending_space {
        let after_boundary = out
          .chars()
          .last()
          .is_some_and(|last| matches!(last, '{' | '}' | ';' | ':' | ','));
        if !out.is_empty() && !boundary && !after_boundary {
          out.push(' ');
        }
        pending_space = false;
      }
      out.push(c);
    }

    if out == text {
      return Ok(None);
    }
    Ok(Some(out.into_bytes()))
  }
}

/// Lossless, size-bounded image pass: currently squeezes inter-tag
/// whitespace out of SVG documents. The output is kept only when it is
/// strictly smaller than the input.
#[derive(Debug)]
pub struct ImageRecompressor;

impl OptimizeStage for ImageRecompressor {
  fn name(&self) -> StageName {
    "image-recompress".into()
  }

  fn applies_to(&self, category: AssetCategory) -> bool {
    category == AssetCategory::Static
  }

  fn apply(&self, args: OptimizeArgs<'_>) -> OptimizeStageOutput {
    if !args.asset_name.ends_with(".svg") {
      return Ok(None);
    }
    let Ok(text) = std::str::from_utf8(args.bytes) else {
      return Ok(None);
    };
    let squeezed = text
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .join("");
    if squeezed.len() >= text.len() {
      return Ok(None);
    }
    Ok(Some(squeezed.into_bytes()))
  }
}

/// Production pass order is fixed: script minify, style minify, image
/// recompression. Compression siblings are a property of the emitter, not a
/// pass.
pub fn default_optimizers() -> Vec<Arc<dyn OptimizeStage>> {
  vec![
    Arc::new(ScriptMinifier),
    Arc::new(StyleMinifier),
    Arc::new(ImageRecompressor),
  ]
}
