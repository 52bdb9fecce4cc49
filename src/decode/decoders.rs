//! Decoder implementations
//!
//! Each decoder handles a specific body format.

use super::types::{BodyDecoder, BodyFormat};
use crate::error::{Error, Result};
use crate::types::JsonValue;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder; an empty body decodes to `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// Create a new JSON decoder
    pub fn new() -> Self {
        Self
    }
}

impl BodyDecoder for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<JsonValue> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonValue::Null);
        }
        serde_json::from_slice(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
    }
}

// ============================================================================
// Text Decoder
// ============================================================================

/// Plain text decoder; the body is carried as a JSON string
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl TextDecoder {
    /// Create a new text decoder
    pub fn new() -> Self {
        Self
    }
}

impl BodyDecoder for TextDecoder {
    fn decode(&self, body: &[u8]) -> Result<JsonValue> {
        let text = std::str::from_utf8(body).map_err(|e| Error::Decode {
            message: format!("Response body is not valid UTF-8: {e}"),
        })?;
        Ok(JsonValue::String(text.to_string()))
    }
}

/// Decode a body according to its `Content-Type`
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<JsonValue> {
    match BodyFormat::from_content_type(content_type) {
        BodyFormat::Json => JsonDecoder.decode(body),
        BodyFormat::Text => TextDecoder.decode(body),
    }
}
