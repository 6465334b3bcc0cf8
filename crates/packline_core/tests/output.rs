use packline_common::Mode;

mod common;

use common::{asset_text, build, has_asset, project};

fn is_hashed(path: &str, prefix: &str, suffix: &str) -> bool {
  let Some(rest) = path.strip_prefix(prefix) else {
    return false;
  };
  let Some(hash) = rest.strip_suffix(suffix) else {
    return false;
  };
  hash.len() == 8 && hash.chars().all(|c| c.is_ascii_hexdigit())
}

#[tokio::test]
async fn production_filenames_carry_an_eight_hex_content_hash() {
  let fixture = project();
  let (_, output) = build(&fixture, Mode::Production).await;

  let app = &output.manifest.assets["app.js"];
  assert!(is_hashed(app, "js/app-", ".js"), "unexpected path: {app}");

  let logo = &output.manifest.assets["logo.svg"];
  assert!(
    is_hashed(logo, "static/logo-", ".svg"),
    "unexpected path: {logo}"
  );
}

#[tokio::test]
async fn production_extracts_styles_into_a_stylesheet_asset() {
  let fixture = project();
  let (_, output) = build(&fixture, Mode::Production).await;

  assert!(asset_text(&output, "app.css").contains("margin"));
  assert!(!asset_text(&output, "app.js").contains("__packline_inject_style"));

  // The entry's stylesheet is part of its entrypoint record.
  let app = &output.manifest.entrypoints["app"];
  assert!(app.iter().any(|path| path.ends_with(".css")));
}

#[tokio::test]
async fn development_inlines_styles_and_skips_optimization() {
  let fixture = project();
  let (_, output) = build(&fixture, Mode::Development).await;

  assert!(asset_text(&output, "app.js").contains("__packline_inject_style"));
  assert!(!has_asset(&output, "app.css"));
  assert!(!fixture.exists("dist/js/app.js.gz"));
  assert!(!fixture.exists("dist/js/app.js.br"));
}

#[tokio::test]
async fn production_writes_compression_siblings() {
  let fixture = project();
  let (_, output) = build(&fixture, Mode::Production).await;

  let app = &output.manifest.assets["app.js"];
  assert!(fixture.exists(format!("dist/{app}.gz")));
  assert!(fixture.exists(format!("dist/{app}.br")));

  let logo = &output.manifest.assets["logo.svg"];
  assert!(fixture.exists(format!("dist/{logo}.gz")));
}

#[tokio::test]
async fn manifest_lands_on_disk_as_valid_json() {
  let fixture = project();
  let (_, output) = build(&fixture, Mode::Production).await;

  let on_disk = fixture.read_to_string("dist/manifest.json");
  let parsed: serde_json::Value = serde_json::from_str(&on_disk).expect("manifest parses");
  assert_eq!(on_disk, output.manifest.to_json());
  assert!(parsed["entrypoints"]["app"].is_array());
  assert!(!fixture.exists("dist/manifest.json.tmp"));
}

#[tokio::test]
async fn stale_output_is_cleaned_before_writing() {
  let fixture = project();
  fixture.write("dist/js/old-bundle.js", "stale");
  let (_, _) = build(&fixture, Mode::Production).await;
  assert!(!fixture.exists("dist/js/old-bundle.js"));
}
