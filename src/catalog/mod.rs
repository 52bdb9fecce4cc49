//! Service catalog module
//!
//! Locates a service's endpoint URL in the catalog returned with an
//! identity token, for both identity v2 and v3.

mod locate;
mod types;

pub use locate::{normalize_url, v2_endpoint_url, v3_endpoint_url};
pub use types::{
    Availability, CatalogEntryV2, CatalogEntryV3, EndpointOpts, EndpointV2, EndpointV3,
    ServiceCatalogV2, ServiceCatalogV3,
};
