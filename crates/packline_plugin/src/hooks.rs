use packline_common::ModuleId;

pub type ModuleHook = Box<dyn Fn(&ModuleId) + Send + Sync>;
pub type AssetHook = Box<dyn Fn(&str) + Send + Sync>;

/// Fixed, enumerated extension points. Third-party observers register
/// callables per point; there is no open inheritance surface.
#[derive(Default)]
pub struct Hooks {
  pub pre_transform: Vec<ModuleHook>,
  pub post_transform: Vec<ModuleHook>,
  pub pre_emit: Vec<AssetHook>,
  pub post_emit: Vec<AssetHook>,
}

impl std::fmt::Debug for Hooks {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Hooks")
      .field("pre_transform", &self.pre_transform.len())
      .field("post_transform", &self.post_transform.len())
      .field("pre_emit", &self.pre_emit.len())
      .field("post_emit", &self.post_emit.len())
      .finish()
  }
}

impl Hooks {
  pub fn run_pre_transform(&self, id: &ModuleId) {
    self.pre_transform.iter().for_each(|hook| hook(id));
  }

  pub fn run_post_transform(&self, id: &ModuleId) {
    self.post_transform.iter().for_each(|hook| hook(id));
  }

  pub fn run_pre_emit(&self, filename: &str) {
    self.pre_emit.iter().for_each(|hook| hook(filename));
  }

  pub fn run_post_emit(&self, filename: &str) {
    self.post_emit.iter().for_each(|hook| hook(filename));
  }
}
