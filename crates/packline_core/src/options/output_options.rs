use std::path::PathBuf;

use packline_common::Mode;
use rustc_hash::FxHashSet;

use crate::{BuildError, BuildResult};

/// Physical filename template. Recognized tokens: `[name]`, `[id]`,
/// `[contenthash]` / `[hash]` (fixed-length digest of the final bytes) and
/// `[ext]` (including the leading dot).
#[derive(Debug, Clone)]
pub struct FileNameTemplate {
  template: String,
}

impl FileNameTemplate {
  pub fn new(template: String) -> Self {
    Self { template }
  }

  pub(crate) fn validate(&self) -> BuildResult<()> {
    if !self.template.contains("[name]") && !self.template.contains("[id]") {
      return Err(BuildError::configuration(format!(
        "filename template \"{}\" must contain [name] or [id]",
        self.template
      )));
    }
    Ok(())
  }

  pub fn render(&self, options: RenderOptions) -> String {
    let mut tmp = self.template.clone();
    if let Some(name) = options.name {
      tmp = tmp.replace("[name]", name);
    }
    if let Some(id) = options.id {
      tmp = tmp.replace("[id]", id);
    }
    if let Some(hash) = options.hash {
      tmp = tmp.replace("[contenthash]", hash).replace("[hash]", hash);
    }
    if let Some(ext) = options.ext {
      tmp = tmp.replace("[ext]", ext);
    }
    tmp
  }
}

impl From<String> for FileNameTemplate {
  fn from(template: String) -> Self {
    Self { template }
  }
}

impl From<&str> for FileNameTemplate {
  fn from(template: &str) -> Self {
    Self {
      template: template.to_string(),
    }
  }
}

#[derive(Debug, Default)]
pub struct RenderOptions<'me> {
  pub name: Option<&'me str>,
  pub id: Option<&'me str>,
  pub hash: Option<&'me str>,
  pub ext: Option<&'me str>,
}

/// Which assets get `.gz`/`.br` siblings.
#[derive(Debug, Clone)]
pub struct CompressionOptions {
  pub extensions: FxHashSet<String>,
  pub min_size: u64,
}

impl Default for CompressionOptions {
  fn default() -> Self {
    Self {
      extensions: [
        "js", "css", "html", "json", "ico", "svg", "eot", "otf", "ttf", "map",
      ]
      .map(String::from)
      .into_iter()
      .collect(),
      min_size: 0,
    }
  }
}

/// Byte-level compression codecs available to the emitter. Injected as a
/// capability rather than probed from the environment so builds stay
/// deterministic and testable.
#[derive(Debug, Clone, Copy)]
pub struct CodecSet {
  pub gzip: bool,
  pub brotli: bool,
}

impl Default for CodecSet {
  fn default() -> Self {
    Self {
      gzip: true,
      brotli: true,
    }
  }
}

#[derive(Debug)]
pub struct OutputOptions {
  pub dir: PathBuf,
  pub entry_file_names: FileNameTemplate,
  pub chunk_file_names: FileNameTemplate,
  pub style_file_names: FileNameTemplate,
  pub static_file_names: FileNameTemplate,
  /// Clear the previous build's output directory before writing.
  pub clean: bool,
  pub compression: CompressionOptions,
  pub codecs: CodecSet,
}

impl Default for OutputOptions {
  fn default() -> Self {
    Self::default_for(Mode::Production)
  }
}

impl OutputOptions {
  /// Production names carry a content hash for cache busting; development
  /// names stay stable across rebuilds for faster iteration.
  pub fn default_for(mode: Mode) -> Self {
    let (entry, chunk, style) = if mode.is_production() {
      (
        "js/[name]-[contenthash].js",
        "js/[name]-[contenthash].chunk.js",
        "css/[name]-[contenthash].css",
      )
    } else {
      ("js/[name].js", "js/[name].chunk.js", "css/[name].css")
    };
    Self {
      dir: PathBuf::from("dist"),
      entry_file_names: entry.into(),
      chunk_file_names: chunk.into(),
      style_file_names: style.into(),
      static_file_names: "static/[name]-[hash][ext]".into(),
      clean: true,
      compression: Default::default(),
      codecs: Default::default(),
    }
  }

  pub(crate) fn validate(&self) -> BuildResult<()> {
    self.entry_file_names.validate()?;
    self.chunk_file_names.validate()?;
    self.style_file_names.validate()?;
    self.static_file_names.validate()?;
    if self.dir.as_os_str().is_empty() {
      return Err(BuildError::configuration("output dir must be non-empty"));
    }
    Ok(())
  }
}
