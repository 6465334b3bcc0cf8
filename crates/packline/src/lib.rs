//! Public surface of the pipeline. Applications depend on this crate;
//! `packline_core` stays an implementation detail.

pub use {
  packline_common::{AssetCategory, ChunkKind, Content, FileClass, Mode, ModuleId},
  packline_core::{
    default_optimizers, default_rules, default_warning_handler, Asset, BuildOutput, BuildResult,
    BuildStats, Bundler, CodecSet, CompressionOptions, EnvReplaceStage, FileNameTemplate,
    ImageRecompressor, InputItem, InputOptions, Manifest, OutputOptions, PassthroughStage,
    RenderOptions, ScriptMinifier, StyleMinifier, TransformRule, WarningHandler,
  },
  packline_error::Error as BuildError,
  packline_plugin::{
    AuxiliaryAsset, BuildChannel, BuildCompleted, Hooks, OptimizeArgs, OptimizeStage,
    OptimizeStageOutput, TransformArgs, TransformStage, TransformStageOutput, TransformedContent,
  },
};
