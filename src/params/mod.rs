//! Options marshaling module
//!
//! Converts options structs into query strings, JSON request bodies and
//! header maps.
//!
//! # Overview
//!
//! Every options struct implements [`Options`] and returns a [`FieldSet`]
//! describing its fields: the value, the query parameter / JSON key / header
//! it maps to, and the constraints it carries (`required`, `or`, `xor`).
//!
//! ```rust,ignore
//! struct ListOpts {
//!     limit: i64,
//!     marker: String,
//! }
//!
//! impl Options for ListOpts {
//!     fn fields(&self) -> FieldSet {
//!         FieldSet::new()
//!             .field(Field::new("Limit", self.limit).query("limit"))
//!             .field(Field::new("Marker", &self.marker).query("marker"))
//!     }
//! }
//!
//! let opts = ListOpts { limit: 1, marker: "abc".into() };
//! let query = build_query_string(&opts)?;
//! assert_eq!(query.encode(), "limit=1&marker=abc");
//! ```

mod builders;
mod time;
mod types;

pub use builders::{
    build_headers, build_query_string, build_request_body, maybe_int, maybe_string, validate,
};
pub use time::TimeFormat;
pub use types::{
    BodyEncodable, Field, FieldSet, FieldValue, HeaderEncodable, ListFormat, Options, Query,
    QueryEncodable,
};
