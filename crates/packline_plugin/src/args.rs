use packline_common::{Content, Mode, ModuleId};
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct TransformArgs<'a> {
  pub id: &'a ModuleId,
  pub content: &'a Content,
  pub mode: Mode,
  /// Environment variables whitelisted by the configuration.
  pub env: &'a FxHashMap<String, String>,
}

#[derive(Debug)]
pub struct OptimizeArgs<'a> {
  pub asset_name: &'a str,
  pub bytes: &'a [u8],
}
