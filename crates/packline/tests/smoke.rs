use packline::{Bundler, InputItem, InputOptions, Mode, OutputOptions};
use packline_test_utils::Fixture;

#[tokio::test]
async fn bundles_a_minimal_project_and_notifies_subscribers() {
  let fixture = Fixture::new().file("src/index.js", "console.log('hello');\n");

  let mut bundler = Bundler::new(InputOptions {
    input: vec![InputItem::new("app", "./src/index.js")],
    mode: Mode::Development,
    cwd: fixture.root(),
    ..Default::default()
  })
  .expect("valid configuration");
  let mut events = bundler.subscribe();

  let output = bundler
    .build(OutputOptions {
      dir: fixture.out_dir(),
      ..OutputOptions::default_for(Mode::Development)
    })
    .await
    .expect("build succeeds");

  assert_eq!(output.stats.modules, 1);
  assert!(fixture.exists("dist/js/app.js"));
  assert!(fixture.exists("dist/manifest.json"));

  let completed = events.try_recv().expect("completion notification");
  assert_eq!(*completed.manifest_json, output.manifest.to_json());
}
