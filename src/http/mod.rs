//! HTTP module
//!
//! The transport collaborator used by the pager and by resource calls.
//!
//! # Features
//!
//! - **Transport trait**: anything that can send a resolved request
//! - **Automatic Retries**: 429, 502, 503, 504, timeouts and connection errors
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Service client**: URL building, status checks and microversions

mod client;
mod service;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use service::{RequestOpts, ServiceClient};
pub use transport::{Transport, TransportRequest, TransportResponse};
