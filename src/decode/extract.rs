//! Typed extraction from decoded bodies

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;

/// Deserialize the whole body into `T`
pub fn extract_into<T: DeserializeOwned>(body: &JsonValue) -> Result<T> {
    T::deserialize(body).map_err(|e| Error::decode(e.to_string()))
}

/// Deserialize the value under `label` into `T`
///
/// An empty label deserializes the body itself.
pub fn extract_into_struct<T: DeserializeOwned>(body: &JsonValue, label: &str) -> Result<T> {
    if label.is_empty() {
        return extract_into(body);
    }
    let value = labeled(body, label)?;
    T::deserialize(value).map_err(|e| Error::decode(format!("{label}: {e}")))
}

/// Deserialize the array under `label` into a `Vec<T>`
///
/// An empty label expects the body itself to be an array.
pub fn extract_into_slice<T: DeserializeOwned>(body: &JsonValue, label: &str) -> Result<Vec<T>> {
    let value = if label.is_empty() {
        body
    } else {
        labeled(body, label)?
    };

    match value {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| T::deserialize(item).map_err(|e| Error::decode(format!("{label}: {e}"))))
            .collect(),
        JsonValue::Null => Ok(Vec::new()),
        other => Err(Error::unexpected_type("array", json_kind(other))),
    }
}

/// Non-empty lines of a text body, or the strings of an array body
pub fn text_lines(body: &JsonValue) -> Result<Vec<String>> {
    match body {
        JsonValue::String(text) => Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s.clone()),
                other => Err(Error::unexpected_type("string", json_kind(other))),
            })
            .collect(),
        JsonValue::Null => Ok(Vec::new()),
        other => Err(Error::unexpected_type("text", json_kind(other))),
    }
}

fn labeled<'a>(body: &'a JsonValue, label: &str) -> Result<&'a JsonValue> {
    match body {
        JsonValue::Object(map) => map
            .get(label)
            .ok_or_else(|| Error::decode(format!("missing field `{label}` in response body"))),
        other => Err(Error::unexpected_type("object", json_kind(other))),
    }
}

/// Name of a JSON value's kind, used in error messages
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
