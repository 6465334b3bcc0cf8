use packline_common::Mode;
use pretty_assertions::assert_eq;

mod common;

use common::{build, output_options, project};

#[tokio::test]
async fn rebuild_reuses_every_unchanged_transform() {
  let fixture = project();
  let (mut bundler, first) = build(&fixture, Mode::Development).await;
  assert_eq!(first.stats.cache_hits, 0);

  let second = bundler
    .build(output_options(&fixture, Mode::Development))
    .await
    .expect("rebuild succeeds");
  assert_eq!(second.stats.modules, first.stats.modules);
  assert_eq!(second.stats.cache_hits, second.stats.modules);
}

#[tokio::test]
async fn editing_one_file_invalidates_only_that_module() {
  let fixture = project();
  let (mut bundler, first) = build(&fixture, Mode::Development).await;

  fixture.write("src/util.js", "export const util = 'util-marker-v2';\n");

  let second = bundler
    .build(output_options(&fixture, Mode::Development))
    .await
    .expect("rebuild succeeds");
  assert_eq!(second.stats.cache_hits, first.stats.modules - 1);
  assert!(common::asset_text(&second, "shared.js").contains("util-marker-v2"));
}

#[tokio::test]
async fn production_builds_are_reproducible() {
  let fixture = project();
  let (_, first) = build(&fixture, Mode::Production).await;
  let (_, second) = build(&fixture, Mode::Production).await;

  assert_eq!(first.manifest.to_json(), second.manifest.to_json());

  let paths = |output: &packline_core::BuildOutput| {
    output
      .assets
      .iter()
      .map(|asset| asset.path.clone())
      .collect::<Vec<_>>()
  };
  assert_eq!(paths(&first), paths(&second));
}
