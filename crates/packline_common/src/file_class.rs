use std::path::Path;
use std::str::FromStr;

/// Coarse classification of a module by file type. Drives which transform
/// rules can match it and which output category its bytes land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileClass {
  Script,
  Style,
  Markup,
  Binary,
}

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "ts", "tsx", "json"];
const STYLE_EXTENSIONS: &[&str] = &["css", "sass", "scss"];
const MARKUP_EXTENSIONS: &[&str] = &["html", "htm"];

impl FileClass {
  /// Unknown extensions are treated as opaque binary assets.
  pub fn from_path(path: &Path) -> Self {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    Self::from_str(ext).unwrap_or(FileClass::Binary)
  }

  pub fn is_binary(self) -> bool {
    self == FileClass::Binary
  }
}

impl FromStr for FileClass {
  type Err = ();

  fn from_str(ext: &str) -> Result<Self, Self::Err> {
    if SCRIPT_EXTENSIONS.contains(&ext) {
      Ok(FileClass::Script)
    } else if STYLE_EXTENSIONS.contains(&ext) {
      Ok(FileClass::Style)
    } else if MARKUP_EXTENSIONS.contains(&ext) {
      Ok(FileClass::Markup)
    } else {
      Err(())
    }
  }
}

/// Output category of an emitted asset. Decides which optimization passes
/// apply and which filename template names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
  Script,
  Style,
  Static,
}
