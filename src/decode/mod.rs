//! Response decoder module
//!
//! Supports: JSON, plain text
//!
//! # Overview
//!
//! Response bodies are decoded into a [`JsonValue`](crate::types::JsonValue)
//! first; text bodies become a JSON string. The extraction helpers then
//! deserialize a labeled part of the body into typed results.

mod decoders;
mod extract;
mod types;

pub use decoders::{decode_body, JsonDecoder, TextDecoder};
pub use extract::{extract_into, extract_into_slice, extract_into_struct, json_kind, text_lines};
pub use types::{BodyDecoder, BodyFormat};
