//! Client configuration loaded from YAML
//!
//! A config file names the service to talk to, either directly by endpoint
//! or through a saved identity token's service catalog, plus HTTP settings.
//!
//! ```yaml
//! endpoint: https://compute.example.com/v2.1/
//! token: gAAAAAB...
//! service_type: compute
//! microversion: "2.79"
//! http:
//!   timeout_seconds: 10
//!   max_retries: 2
//! ```

use crate::catalog::{
    v2_endpoint_url, v3_endpoint_url, Availability, EndpointOpts, ServiceCatalogV2,
    ServiceCatalogV3,
};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, ServiceClient, Transport};
use crate::types::{BackoffType, JsonValue, OptionStringExt, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service endpoint; takes precedence over the catalog
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Token sent as `X-Auth-Token`
    #[serde(default)]
    pub token: Option<String>,

    /// Service type, e.g. `compute`; selects the microversion header
    #[serde(default)]
    pub service_type: String,

    /// API microversion to request
    #[serde(default)]
    pub microversion: Option<String>,

    /// Base URL for resources when it differs from the endpoint
    #[serde(default)]
    pub resource_base: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Locate the endpoint in a saved service catalog
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

// ============================================================================
// Catalog Config
// ============================================================================

/// Where to find a service catalog and which endpoint to take from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file holding an identity v2 or v3 token response
    pub path: PathBuf,

    /// Service name; empty matches any
    #[serde(default)]
    pub name: String,

    /// Region; empty matches any
    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub availability: Availability,
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60_000
}

// ============================================================================
// Loading
// ============================================================================

/// Load a client configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_config_from_str(&content)
}

/// Load a client configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<ClientConfig> {
    let config: ClientConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;

    config.validate()?;
    Ok(config)
}

impl ClientConfig {
    /// Check the configuration for values no client could use
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = self.endpoint.clone().none_if_empty() {
            url::Url::parse(&endpoint)
                .map_err(|e| Error::config(format!("Invalid endpoint '{endpoint}': {e}")))?;
        }

        if self.catalog.is_some() && self.service_type.is_empty() {
            return Err(Error::config(
                "service_type is required to look up an endpoint in the catalog",
            ));
        }

        if self.http.timeout_seconds == 0 {
            return Err(Error::config("http.timeout_seconds must be greater than 0"));
        }

        Ok(())
    }

    /// Settings for the reqwest-backed HTTP client
    pub fn http_client_config(&self) -> HttpClientConfig {
        let backoff = &self.http.retry_backoff;
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                backoff.backoff_type,
                Duration::from_millis(backoff.initial_ms),
                Duration::from_millis(backoff.max_ms),
            );

        if let Some(token) = &self.token {
            builder = builder.token(token);
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Selection criteria for the configured catalog
    pub fn endpoint_opts(&self) -> Option<EndpointOpts> {
        self.catalog.as_ref().map(|catalog| {
            EndpointOpts::new(&self.service_type)
                .name(&catalog.name)
                .region(&catalog.region)
                .availability(catalog.availability)
        })
    }

    /// The endpoint to use: the configured one, or one found in the catalog
    pub fn resolve_endpoint(&self) -> Result<String> {
        // An empty endpoint counts as unset
        if let Some(endpoint) = self.endpoint.clone().none_if_empty() {
            return Ok(endpoint);
        }

        match (&self.catalog, self.endpoint_opts()) {
            (Some(catalog), Some(opts)) => {
                let content = fs::read_to_string(&catalog.path).map_err(|e| {
                    Error::config(format!(
                        "Failed to read catalog file '{}': {}",
                        catalog.path.display(),
                        e
                    ))
                })?;
                let token: JsonValue = serde_json::from_str(&content)?;
                let url = endpoint_from_token(&token, &opts)?;
                debug!(endpoint = %url, service_type = %opts.service_type, "Resolved endpoint from catalog");
                Ok(url)
            }
            _ => Err(Error::config("No endpoint or catalog configured")),
        }
    }

    /// Build a service client over `transport` from this configuration
    pub fn service_client(&self, transport: Arc<dyn Transport>) -> Result<ServiceClient> {
        let mut client = ServiceClient::new(transport, self.resolve_endpoint()?)
            .with_service_type(&self.service_type);

        if let Some(base) = &self.resource_base {
            client = client.with_resource_base(base);
        }
        if let Some(version) = &self.microversion {
            client = client.with_microversion(version);
        }
        for (key, value) in &self.headers {
            client = client.with_header(key, value);
        }
        Ok(client)
    }
}

/// Locate an endpoint in a v2 (`access.serviceCatalog`) or v3 (`token.catalog`)
/// token response; a bare catalog object is accepted too
fn endpoint_from_token(token: &JsonValue, opts: &EndpointOpts) -> Result<String> {
    let v3 = token.get("token").unwrap_or(token);
    if v3.get("catalog").is_some() {
        let catalog: ServiceCatalogV3 = serde_json::from_value(v3.clone())?;
        return v3_endpoint_url(&catalog, opts);
    }

    let v2 = token.get("access").unwrap_or(token);
    if v2.get("serviceCatalog").is_some() {
        let catalog: ServiceCatalogV2 = serde_json::from_value(v2.clone())?;
        return v2_endpoint_url(&catalog, opts);
    }

    Err(Error::config(
        "Catalog file holds neither a v2 nor a v3 service catalog",
    ))
}
