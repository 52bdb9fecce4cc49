//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::decode::json_kind;
use crate::error::{Error, Result};
use crate::http::TransportResponse;
use crate::params::Query;
use crate::types::{JsonValue, StringMap};
use serde::{Deserialize, Serialize};
use url::Url;

/// One fetched page: where it came from and its decoded body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// URL the page was requested from
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers, lower-case names
    pub headers: StringMap,
    /// Decoded body; text bodies are carried as a JSON string
    pub body: JsonValue,
}

impl PageResult {
    /// Wrap a transport response fetched from `url`
    pub fn from_response(url: impl Into<String>, response: &TransportResponse) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            status: response.status,
            headers: response.headers.clone(),
            body: response.body_value()?,
        })
    }

    /// Create a page result from a body, as if fetched with status 200
    pub fn new(url: impl Into<String>, body: JsonValue) -> Self {
        Self {
            url: url.into(),
            status: 200,
            headers: StringMap::new(),
            body,
        }
    }

    /// Query parameters of the page URL
    pub fn query(&self) -> Result<Query> {
        let url = Url::parse(&self.url)?;
        Ok(Query::parse(url.query().unwrap_or_default()))
    }
}

/// One page of a paginated collection
///
/// A page answers, without further I/O, whether it is empty and where the
/// next page lives.
pub trait Page: Send {
    /// The fetched page this value wraps
    fn result(&self) -> &PageResult;

    /// URL of the following page, or `None` at the end of the collection
    fn next_page_url(&self) -> Result<Option<String>>;

    /// True if the page holds no items; an empty page ends iteration
    fn is_empty(&self) -> Result<bool>;

    /// Decoded page body
    fn body(&self) -> &JsonValue {
        &self.result().body
    }
}

/// A page whose successor is requested with the last item's marker
pub trait MarkerPage: Page {
    /// Marker of the last item on this page, `None` if there is none
    fn last_marker(&self) -> Result<Option<String>>;
}

/// Link object as embedded in collection bodies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// The `href` of the first link whose relation is `next`
pub fn extract_next_url(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "next")
        .map(|link| link.href.clone())
}

/// Items of a collection body
///
/// With an items key the array under that key is used. Without one, an
/// array body is used as is, and for an object body the first array field
/// whose key does not end in `links` is. `None` means no items were found.
pub fn collection_items<'a>(
    body: &'a JsonValue,
    items_key: Option<&str>,
) -> Result<Option<&'a Vec<JsonValue>>> {
    match (body, items_key) {
        (JsonValue::Null, _) => Ok(None),
        (JsonValue::Object(map), Some(key)) => match map.get(key) {
            Some(JsonValue::Array(items)) => Ok(Some(items)),
            Some(JsonValue::Null) | None => Ok(None),
            Some(other) => Err(Error::unexpected_type("array", json_kind(other))),
        },
        (JsonValue::Array(items), None) => Ok(Some(items)),
        (JsonValue::Object(map), None) => Ok(map.iter().find_map(|(key, value)| match value {
            JsonValue::Array(items) if !key.ends_with("links") => Some(items),
            _ => None,
        })),
        (other, _) => Err(Error::unexpected_type("collection", json_kind(other))),
    }
}

/// Replace one query parameter of a URL
pub fn with_query_param(url: &str, name: &str, value: &str) -> Result<String> {
    let mut url = Url::parse(url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(name, value);
    Ok(url.to_string())
}
