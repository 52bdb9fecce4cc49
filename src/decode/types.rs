//! Decoder types and traits
//!
//! Defines the core decoder abstractions.

use crate::error::Result;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Format of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    /// JSON document (default)
    #[default]
    Json,
    /// Plain text, e.g. object storage listings
    Text,
}

impl BodyFormat {
    /// Pick a format from a `Content-Type` header value
    ///
    /// Anything that is not JSON is treated as text.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) => {
                let mime = ct.split(';').next().unwrap_or_default().trim();
                if mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json") {
                    Self::Json
                } else {
                    Self::Text
                }
            }
            None => Self::Json,
        }
    }
}

/// Trait for turning a raw response body into a JSON value
pub trait BodyDecoder: Send + Sync {
    /// Decode a response body
    fn decode(&self, body: &[u8]) -> Result<JsonValue>;
}
