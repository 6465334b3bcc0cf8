use std::sync::Arc;

use packline_common::Mode;
use packline_core::{Bundler, InputItem, InputOptions, PassthroughStage, TransformRule};
use packline_plugin::{TransformArgs, TransformStage, TransformStageOutput};
use packline_test_utils::{Fixture, WarningLog};

mod common;

#[derive(Debug)]
struct FailingStage;

#[async_trait::async_trait]
impl TransformStage for FailingStage {
  fn name(&self) -> packline_plugin::StageName {
    "failing".into()
  }

  async fn apply(&self, _args: TransformArgs<'_>) -> TransformStageOutput {
    anyhow::bail!("syntax error at line 1")
  }
}

#[tokio::test]
async fn malformed_rule_pattern_fails_before_any_work() {
  let fixture = common::project();
  let err = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    cwd: fixture.root(),
    rules: vec![TransformRule::new(
      "[",
      vec![Arc::new(PassthroughStage::new("x"))],
    )],
    ..Default::default()
  })
  .err()
  .expect("invalid pattern is rejected");
  assert_eq!(err.code(), "INVALID_CONFIG");
  assert!(!fixture.exists("dist"));
}

#[tokio::test]
async fn empty_stage_chain_is_a_configuration_error() {
  let fixture = common::project();
  let err = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    cwd: fixture.root(),
    rules: vec![TransformRule::new("**/*.js", vec![])],
    ..Default::default()
  })
  .err()
  .expect("empty chain is rejected");
  assert_eq!(err.code(), "INVALID_CONFIG");
}

#[tokio::test]
async fn unresolvable_entry_is_fatal_in_every_mode() {
  for mode in [Mode::Development, Mode::Production] {
    let fixture = common::project();
    let mut bundler = Bundler::new(InputOptions {
      input: vec![InputItem::new("app", "./src/missing.js")],
      mode,
      cwd: fixture.root(),
      ..Default::default()
    })
    .expect("configuration is valid");
    let err = bundler
      .build(common::output_options(&fixture, mode))
      .await
      .err()
      .expect("missing entry fails the build");
    assert_eq!(err.code(), "UNRESOLVED_ENTRY");
    assert!(!fixture.exists("dist/manifest.json"));
  }
}

#[tokio::test]
async fn unresolved_import_degrades_in_development() {
  let fixture = Fixture::new().file(
    "src/index.js",
    "import { gone } from './nope.js';\nconsole.log(gone);\n",
  );
  let warnings = WarningLog::default();
  let mut bundler = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    mode: Mode::Development,
    cwd: fixture.root(),
    on_warn: warnings.handler(),
    ..Default::default()
  })
  .expect("configuration is valid");

  let output = bundler
    .build(common::output_options(&fixture, Mode::Development))
    .await
    .expect("development build degrades instead of failing");
  assert_eq!(output.stats.modules, 1);
  assert_eq!(warnings.codes(), vec!["UNRESOLVED_IMPORT"]);
  assert!(fixture.exists("dist/manifest.json"));
}

#[tokio::test]
async fn unresolved_import_fails_in_production() {
  let fixture = Fixture::new().file(
    "src/index.js",
    "import { gone } from './nope.js';\nconsole.log(gone);\n",
  );
  let mut bundler = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    mode: Mode::Production,
    cwd: fixture.root(),
    ..Default::default()
  })
  .expect("configuration is valid");

  let err = bundler
    .build(common::output_options(&fixture, Mode::Production))
    .await
    .err()
    .expect("production build fails");
  assert_eq!(err.code(), "UNRESOLVED_IMPORT");
  assert!(!fixture.exists("dist/manifest.json"));
}

#[tokio::test]
async fn failing_transform_degrades_in_development() {
  let fixture = Fixture::new().file("src/index.js", "console.log('hello');\n");
  let warnings = WarningLog::default();
  let mut bundler = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    mode: Mode::Development,
    cwd: fixture.root(),
    rules: vec![TransformRule::new("**/*.js", vec![Arc::new(FailingStage)])],
    on_warn: warnings.handler(),
    ..Default::default()
  })
  .expect("configuration is valid");

  let output = bundler
    .build(common::output_options(&fixture, Mode::Development))
    .await
    .expect("development build degrades instead of failing");
  assert_eq!(warnings.codes(), vec!["TRANSFORM_FAILED"]);
  assert!(common::asset_text(&output, "app.js").contains("failed to transform"));
}

#[tokio::test]
async fn failing_transform_fails_in_production() {
  let fixture = Fixture::new().file("src/index.js", "console.log('hello');\n");
  let mut bundler = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    mode: Mode::Production,
    cwd: fixture.root(),
    rules: vec![TransformRule::new("**/*.js", vec![Arc::new(FailingStage)])],
    ..Default::default()
  })
  .expect("configuration is valid");

  let err = bundler
    .build(common::output_options(&fixture, Mode::Production))
    .await
    .err()
    .expect("production build fails");
  assert_eq!(err.code(), "TRANSFORM_FAILED");
  assert!(!fixture.exists("dist"));
}
