//! Service catalog records returned by the identity service

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of a service's endpoint URLs to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Public,
    Internal,
    Admin,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" | "publicURL" => Ok(Self::Public),
            "internal" | "internalURL" => Ok(Self::Internal),
            "admin" | "adminURL" => Ok(Self::Admin),
            other => Err(Error::InvalidAvailability {
                value: other.to_string(),
            }),
        }
    }
}

/// Criteria selecting one endpoint from a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOpts {
    /// Service type, e.g. `compute`; required
    #[serde(rename = "type")]
    pub service_type: String,
    /// Service name; empty matches any
    #[serde(default)]
    pub name: String,
    /// Region; empty matches any
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub availability: Availability,
}

impl EndpointOpts {
    pub fn new(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }
}

// ============================================================================
// Identity v2
// ============================================================================

/// Service catalog from an identity v2 token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalogV2 {
    #[serde(rename = "serviceCatalog", default)]
    pub entries: Vec<CatalogEntryV2>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryV2 {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointV2>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointV2 {
    #[serde(rename = "tenantId", default)]
    pub tenant_id: String,
    #[serde(rename = "publicURL", default)]
    pub public_url: String,
    #[serde(rename = "internalURL", default)]
    pub internal_url: String,
    #[serde(rename = "adminURL", default)]
    pub admin_url: String,
    #[serde(default)]
    pub region: String,
    #[serde(rename = "versionId", default)]
    pub version_id: String,
}

impl EndpointV2 {
    /// URL for the given availability
    pub fn url(&self, availability: Availability) -> &str {
        match availability {
            Availability::Public => &self.public_url,
            Availability::Internal => &self.internal_url,
            Availability::Admin => &self.admin_url,
        }
    }
}

// ============================================================================
// Identity v3
// ============================================================================

/// Service catalog from an identity v3 token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalogV3 {
    #[serde(rename = "catalog", default)]
    pub entries: Vec<CatalogEntryV3>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryV3 {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointV3>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointV3 {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub region_id: String,
    /// `public`, `internal` or `admin`
    pub interface: String,
    pub url: String,
}
