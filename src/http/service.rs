//! Service client bound to one OpenStack service endpoint

use super::transport::{Transport, TransportRequest, TransportResponse};
use crate::catalog::normalize_url;
use crate::error::{Error, Result};
use crate::params::{build_headers, Options};
use crate::types::{JsonObject, JsonValue, Method, StringMap};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// ============================================================================
// Request Options
// ============================================================================

/// Per-request options for [`ServiceClient`] calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOpts {
    /// JSON request body
    pub json_body: Option<JsonValue>,
    /// Accepted status codes; empty means the method's defaults
    pub ok_codes: Vec<u16>,
    /// Extra headers for this request
    pub more_headers: StringMap,
    /// Headers removed from the request, including client-wide ones
    pub omit_headers: Vec<String>,
}

impl RequestOpts {
    /// Create empty request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: impl Into<JsonValue>) -> Self {
        self.json_body = Some(body.into());
        self
    }

    /// Accept only these status codes
    #[must_use]
    pub fn ok_codes(mut self, codes: &[u16]) -> Self {
        self.ok_codes = codes.to_vec();
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.more_headers, key.into(), value.into());
        self
    }

    /// Add every header built from an options struct
    pub fn headers_from(mut self, opts: &impl Options) -> Result<Self> {
        for (key, value) in build_headers(opts)? {
            set_header(&mut self.more_headers, key, value);
        }
        Ok(self)
    }

    /// Drop a header from the request
    #[must_use]
    pub fn omit_header(mut self, key: impl Into<String>) -> Self {
        self.omit_headers.push(key.into());
        self
    }
}

// ============================================================================
// Service Client
// ============================================================================

/// Client for a single service endpoint
///
/// Cheap to clone; every clone shares the same transport.
#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    resource_base: Option<String>,
    more_headers: StringMap,
    service_type: String,
    microversion: Option<String>,
}

impl ServiceClient {
    /// Create a client for `endpoint`; a trailing slash is added if missing
    pub fn new(transport: Arc<dyn Transport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: normalize_url(&endpoint.into()),
            resource_base: None,
            more_headers: StringMap::new(),
            service_type: String::new(),
            microversion: None,
        }
    }

    /// Use a base URL for resources that differs from the endpoint
    #[must_use]
    pub fn with_resource_base(mut self, base: impl Into<String>) -> Self {
        self.resource_base = Some(normalize_url(&base.into()));
        self
    }

    /// Set the service type, e.g. `compute`
    #[must_use]
    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    /// Request an API microversion on every call
    #[must_use]
    pub fn with_microversion(mut self, microversion: impl Into<String>) -> Self {
        self.microversion = Some(microversion.into());
        self
    }

    /// Add a header sent on every request
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.more_headers, key.into(), value.into());
        self
    }

    /// The service endpoint, always ending in `/`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn microversion(&self) -> Option<&str> {
        self.microversion.as_deref()
    }

    /// Base URL that resource paths are appended to
    pub fn resource_base_url(&self) -> &str {
        self.resource_base.as_deref().unwrap_or(&self.endpoint)
    }

    /// Join path segments onto the resource base URL
    pub fn service_url(&self, parts: &[&str]) -> String {
        format!("{}{}", self.resource_base_url(), parts.join("/"))
    }

    // ------------------------------------------------------------------------
    // Verbs
    // ------------------------------------------------------------------------

    /// GET a URL, accepting 200
    pub async fn get(&self, cancel: &CancellationToken, url: &str) -> Result<TransportResponse> {
        self.request(cancel, Method::GET, url, RequestOpts::default())
            .await
    }

    pub async fn get_with_opts(
        &self,
        cancel: &CancellationToken,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::GET, url, opts).await
    }

    /// POST a JSON body, accepting 201 and 202
    pub async fn post(
        &self,
        cancel: &CancellationToken,
        url: &str,
        body: JsonObject,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::POST, url, RequestOpts::new().json(body))
            .await
    }

    pub async fn post_with_opts(
        &self,
        cancel: &CancellationToken,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::POST, url, opts).await
    }

    /// PUT a JSON body, accepting 201 and 202
    pub async fn put(
        &self,
        cancel: &CancellationToken,
        url: &str,
        body: JsonObject,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::PUT, url, RequestOpts::new().json(body))
            .await
    }

    pub async fn put_with_opts(
        &self,
        cancel: &CancellationToken,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::PUT, url, opts).await
    }

    /// PATCH a JSON body, accepting 200, 202 and 204
    pub async fn patch(
        &self,
        cancel: &CancellationToken,
        url: &str,
        body: JsonObject,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::PATCH, url, RequestOpts::new().json(body))
            .await
    }

    pub async fn patch_with_opts(
        &self,
        cancel: &CancellationToken,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::PATCH, url, opts).await
    }

    /// DELETE a URL, accepting 202 and 204
    pub async fn delete(&self, cancel: &CancellationToken, url: &str) -> Result<TransportResponse> {
        self.request(cancel, Method::DELETE, url, RequestOpts::default())
            .await
    }

    pub async fn delete_with_opts(
        &self,
        cancel: &CancellationToken,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::DELETE, url, opts).await
    }

    /// HEAD a URL, accepting 204
    pub async fn head(&self, cancel: &CancellationToken, url: &str) -> Result<TransportResponse> {
        self.request(cancel, Method::HEAD, url, RequestOpts::default())
            .await
    }

    pub async fn head_with_opts(
        &self,
        cancel: &CancellationToken,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        self.request(cancel, Method::HEAD, url, opts).await
    }

    /// Send a request and check the response status
    pub async fn request(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: &str,
        opts: RequestOpts,
    ) -> Result<TransportResponse> {
        let ok_codes = if opts.ok_codes.is_empty() {
            method.default_ok_codes().to_vec()
        } else {
            opts.ok_codes
        };

        let mut headers = self.more_headers.clone();
        self.add_microversion_headers(&mut headers);
        for (key, value) in opts.more_headers {
            set_header(&mut headers, key, value);
        }
        for omitted in &opts.omit_headers {
            headers.retain(|k, _| !k.eq_ignore_ascii_case(omitted));
        }

        let request = TransportRequest {
            method,
            url: url.to_string(),
            headers,
            body: opts.json_body,
        };

        debug!("{} {}", method, url);
        let response = self.transport.send(request, cancel).await?;

        if !ok_codes.contains(&response.status) {
            return Err(Error::UnexpectedResponseCode {
                method: method.to_string(),
                url: url.to_string(),
                expected: ok_codes,
                actual: response.status,
                body: response.text(),
            });
        }

        Ok(response)
    }

    fn add_microversion_headers(&self, headers: &mut StringMap) {
        let Some(ref version) = self.microversion else {
            return;
        };
        if let Some(name) = microversion_header(&self.service_type) {
            set_header(headers, name.to_string(), version.clone());
        }
        if !self.service_type.is_empty() {
            set_header(
                headers,
                "OpenStack-API-Version".to_string(),
                format!("{} {version}", self.service_type),
            );
        }
    }
}

/// Insert a header, replacing one whose name differs only in case
fn set_header(headers: &mut StringMap, key: String, value: String) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
    headers.insert(key, value);
}

/// Legacy per-service microversion header
fn microversion_header(service_type: &str) -> Option<&'static str> {
    match service_type {
        "compute" => Some("X-OpenStack-Nova-API-Version"),
        "sharev2" => Some("X-OpenStack-Manila-API-Version"),
        "volume" => Some("X-OpenStack-Volume-API-Version"),
        "baremetal" => Some("X-OpenStack-Ironic-API-Version"),
        "baremetal-introspection" => Some("X-OpenStack-Ironic-Inspector-API-Version"),
        _ => None,
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("endpoint", &self.endpoint)
            .field("resource_base", &self.resource_base)
            .field("service_type", &self.service_type)
            .field("microversion", &self.microversion)
            .finish_non_exhaustive()
    }
}
