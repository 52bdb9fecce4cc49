//! Endpoint lookup in identity service catalogs

use super::types::{EndpointOpts, ServiceCatalogV2, ServiceCatalogV3};
use crate::error::{Error, Result};
use tracing::debug;

/// Ensure a URL ends with `/` so paths can be appended to it
pub fn normalize_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Find an endpoint URL in an identity v2 catalog
///
/// Entries must match the service type, and the name and region when given.
/// When several endpoints match, the first one wins.
pub fn v2_endpoint_url(catalog: &ServiceCatalogV2, opts: &EndpointOpts) -> Result<String> {
    let endpoint = catalog
        .entries
        .iter()
        .filter(|entry| {
            entry.service_type == opts.service_type
                && (opts.name.is_empty() || entry.name == opts.name)
        })
        .flat_map(|entry| entry.endpoints.iter())
        .find(|endpoint| opts.region.is_empty() || endpoint.region == opts.region)
        .ok_or(Error::EndpointNotFound)?;

    let url = normalize_url(endpoint.url(opts.availability));
    debug!("Located {} endpoint {}", opts.service_type, url);
    Ok(url)
}

/// Find an endpoint URL in an identity v3 catalog
///
/// Like [`v2_endpoint_url`], but the endpoint's interface must equal the
/// requested availability, and the region may match by name or id.
pub fn v3_endpoint_url(catalog: &ServiceCatalogV3, opts: &EndpointOpts) -> Result<String> {
    let interface = opts.availability.as_str();
    let endpoint = catalog
        .entries
        .iter()
        .filter(|entry| {
            entry.service_type == opts.service_type
                && (opts.name.is_empty() || entry.name == opts.name)
        })
        .flat_map(|entry| entry.endpoints.iter())
        .find(|endpoint| {
            endpoint.interface == interface
                && (opts.region.is_empty()
                    || endpoint.region == opts.region
                    || endpoint.region_id == opts.region)
        })
        .ok_or(Error::EndpointNotFound)?;

    let url = normalize_url(&endpoint.url);
    debug!("Located {} endpoint {}", opts.service_type, url);
    Ok(url)
}
