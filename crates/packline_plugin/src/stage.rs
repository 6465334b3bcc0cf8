use std::borrow::Cow;
use std::fmt::Debug;

use packline_common::{AssetCategory, Content};

use crate::{OptimizeArgs, TransformArgs};

pub type StageName<'a> = Cow<'a, str>;

/// Extra output produced by a transform stage alongside the main content,
/// e.g. a companion sourcemap. Resolved into a sibling file of the owning
/// asset at emit time.
#[derive(Debug, Clone)]
pub struct AuxiliaryAsset {
  /// Appended to the owning asset's physical filename (e.g. ".map").
  pub suffix: String,
  pub content: Vec<u8>,
}

#[derive(Debug)]
pub struct TransformedContent {
  pub content: Content,
  pub auxiliary: Vec<AuxiliaryAsset>,
}

impl TransformedContent {
  pub fn new(content: Content) -> Self {
    Self {
      content,
      auxiliary: vec![],
    }
  }
}

/// `Ok(None)` means the stage leaves the content untouched.
pub type TransformStageOutput = anyhow::Result<Option<TransformedContent>>;
pub type OptimizeStageOutput = anyhow::Result<Option<Vec<u8>>>;

/// One link of a transform chain. The concrete transpilation logic is opaque
/// to the pipeline; only the content-in/content-out shape is fixed.
#[async_trait::async_trait]
pub trait TransformStage: Debug + Send + Sync {
  fn name(&self) -> StageName;

  async fn apply(&self, args: TransformArgs<'_>) -> TransformStageOutput;
}

/// A production-only post-processing pass (minifier, image recompressor).
/// Runs under a rayon pool, hence synchronous.
pub trait OptimizeStage: Debug + Send + Sync {
  fn name(&self) -> StageName;

  fn applies_to(&self, category: AssetCategory) -> bool;

  fn apply(&self, args: OptimizeArgs<'_>) -> OptimizeStageOutput;
}
