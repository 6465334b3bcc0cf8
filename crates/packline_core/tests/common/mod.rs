#![allow(dead_code)]

use packline_common::Mode;
use packline_core::{BuildOutput, Bundler, InputItem, InputOptions, OutputOptions};
use packline_test_utils::Fixture;

/// A two-entry project exercising every edge kind: static imports, a style
/// import with a referenced binary, and a dynamic import boundary.
pub fn project() -> Fixture {
  Fixture::new()
    .file(
      "src/index.js",
      "import { util } from './util.js';\nimport './styles.css';\nconst page = import('./lazy.js');\nconsole.log(util, page);\n",
    )
    .file(
      "src/about.js",
      "import { util } from './util.js';\nconsole.log('about', util);\n",
    )
    .file("src/util.js", "export const util = 'util-marker';\n")
    .file("src/lazy.js", "export const lazy = 'lazy-marker';\n")
    .file(
      "src/styles.css",
      "body { background: url('./logo.svg'); margin: 0; }\n",
    )
    .file("src/logo.svg", "<svg>\n  <rect/>\n</svg>\n")
}

pub fn input_options(fixture: &Fixture, mode: Mode) -> InputOptions {
  InputOptions {
    input: vec![
      InputItem::new("app", "./src/index.js"),
      InputItem::new("about", "./src/about.js"),
    ],
    mode,
    cwd: fixture.root(),
    ..Default::default()
  }
}

pub fn output_options(fixture: &Fixture, mode: Mode) -> OutputOptions {
  OutputOptions {
    dir: fixture.out_dir(),
    ..OutputOptions::default_for(mode)
  }
}

pub async fn build(fixture: &Fixture, mode: Mode) -> (Bundler, BuildOutput) {
  let mut bundler = Bundler::new(input_options(fixture, mode)).expect("valid configuration");
  let output = bundler
    .build(output_options(fixture, mode))
    .await
    .expect("build succeeds");
  (bundler, output)
}

/// Bytes of the asset with the given logical name, as text.
pub fn asset_text(output: &BuildOutput, logical: &str) -> String {
  let asset = output
    .assets
    .iter()
    .find(|asset| asset.name == logical)
    .unwrap_or_else(|| panic!("no asset named {logical}"));
  String::from_utf8(asset.bytes.clone()).expect("asset is text")
}

pub fn has_asset(output: &BuildOutput, logical: &str) -> bool {
  output.assets.iter().any(|asset| asset.name == logical)
}
