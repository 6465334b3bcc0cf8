/// Module content flowing through the transform chain. Binary assets stay as
/// opaque byte buffers and bypass textual stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
  Text(String),
  Bytes(Vec<u8>),
}

impl Content {
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Content::Text(text) => text.as_bytes(),
      Content::Bytes(bytes) => bytes,
    }
  }

  pub fn into_bytes(self) -> Vec<u8> {
    match self {
      Content::Text(text) => text.into_bytes(),
      Content::Bytes(bytes) => bytes,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Content::Text(text) => Some(text),
      Content::Bytes(_) => None,
    }
  }

  pub fn is_binary(&self) -> bool {
    matches!(self, Content::Bytes(_))
  }
}

impl From<String> for Content {
  fn from(value: String) -> Self {
    Content::Text(value)
  }
}

impl From<Vec<u8>> for Content {
  fn from(value: Vec<u8>) -> Self {
    Content::Bytes(value)
  }
}
