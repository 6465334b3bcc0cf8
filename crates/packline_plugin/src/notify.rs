use std::sync::Arc;

use tokio::sync::broadcast;

/// Published once per successful build. A dev server subscribes to this and
/// to the manifest; it never touches pipeline internals.
#[derive(Debug, Clone)]
pub struct BuildCompleted {
  pub manifest_json: Arc<String>,
}

#[derive(Debug)]
pub struct BuildChannel {
  tx: broadcast::Sender<BuildCompleted>,
}

impl Default for BuildChannel {
  fn default() -> Self {
    let (tx, _) = broadcast::channel(16);
    Self { tx }
  }
}

impl BuildChannel {
  pub fn subscribe(&self) -> broadcast::Receiver<BuildCompleted> {
    self.tx.subscribe()
  }

  pub fn notify(&self, manifest_json: String) {
    // No subscribers is fine; the send result only reports that.
    let _ = self.tx.send(BuildCompleted {
      manifest_json: Arc::new(manifest_json),
    });
  }
}
