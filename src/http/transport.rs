//! Transport abstraction between the service client and the wire

use crate::decode::decode_body;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method, StringMap};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// A fully resolved request handed to a [`Transport`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: StringMap,
    pub body: Option<JsonValue>,
}

impl TransportRequest {
    /// Create a request without headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response returned by a [`Transport`]
///
/// Header names are lower-case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub url: String,
    pub status: u16,
    pub headers: StringMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body according to its `Content-Type`
    pub fn body_value(&self) -> Result<JsonValue> {
        decode_body(self.header("content-type"), &self.body)
    }

    /// Deserialize a JSON body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
    }
}

/// Sends requests over the wire
///
/// Implementations own retries and timeouts. Cancelling `cancel` aborts the
/// in-flight request with [`Error::Cancelled`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse>;
}
