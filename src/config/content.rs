use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// File content embedded into a secret or config map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum ContentBlob {
    Text(String),
    Base64(String),
}

impl ContentBlob {
    /// UTF-8 content stays readable, anything else is base64 encoded
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => ContentBlob::Text(text),
            Err(err) => ContentBlob::Base64(STANDARD.encode(err.into_bytes())),
        }
    }

    /// Base64 form regardless of how the content is held
    pub fn to_base64(&self) -> String {
        match self {
            ContentBlob::Text(text) => STANDARD.encode(text.as_bytes()),
            ContentBlob::Base64(encoded) => encoded.clone(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlob::Text(_))
    }
}
