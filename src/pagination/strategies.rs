//! Pagination strategy implementations
//!
//! Each base handles a specific continuation pattern. Resource pages either
//! use a base directly or wrap one and delegate to it.

use super::types::{
    collection_items, extract_next_url, with_query_param, Link, MarkerPage, Page, PageResult,
};
use crate::decode::json_kind;
use crate::error::{Error, Result};
use crate::types::JsonValue;

// ============================================================================
// Single Page
// ============================================================================

/// A collection returned in full by one request
///
/// Never has a next page and never reports empty, so iteration always hands
/// exactly one page to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinglePageBase {
    result: PageResult,
}

impl SinglePageBase {
    pub fn new(result: PageResult) -> Self {
        Self { result }
    }
}

impl Page for SinglePageBase {
    fn result(&self) -> &PageResult {
        &self.result
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(false)
    }
}

// ============================================================================
// Linked Pages
// ============================================================================

/// A page that embeds the URL of the next page in its body
///
/// The link is found by walking `link_path` through the body. The value at
/// the end of the path may be:
/// - a URL string (`{"next": "..."}` style)
/// - an array of link objects, the one with `rel == "next"` is used
///   (`{"servers_links": [...]}` style)
/// - an object whose `next` entry is the URL (`{"links": {"next": ...}}` style)
/// - null or missing, meaning this is the last page
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedPageBase {
    result: PageResult,
    link_path: Vec<String>,
    items_key: Option<String>,
}

impl LinkedPageBase {
    /// Create a linked page with the default `links` path
    pub fn new(result: PageResult) -> Self {
        Self {
            result,
            link_path: vec!["links".to_string()],
            items_key: None,
        }
    }

    /// Walk a different path to find the next link
    #[must_use]
    pub fn with_link_path(mut self, path: &[&str]) -> Self {
        self.link_path = path.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Read items from this key when testing for emptiness
    #[must_use]
    pub fn with_items_key(mut self, key: impl Into<String>) -> Self {
        self.items_key = Some(key.into());
        self
    }

    pub fn link_path(&self) -> &[String] {
        &self.link_path
    }
}

impl Page for LinkedPageBase {
    fn result(&self) -> &PageResult {
        &self.result
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        let mut current = &self.result.body;
        for key in &self.link_path {
            match current {
                JsonValue::Object(map) => match map.get(key) {
                    Some(value) => current = value,
                    None => return Ok(None),
                },
                JsonValue::Null => return Ok(None),
                other => {
                    return Err(Error::unexpected_type(
                        format!("object at `{key}`"),
                        json_kind(other),
                    ))
                }
            }
        }
        next_from_link_value(current)
    }

    fn is_empty(&self) -> Result<bool> {
        let items = collection_items(&self.result.body, self.items_key.as_deref())?;
        Ok(items.map_or(true, Vec::is_empty))
    }
}

fn next_from_link_value(value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(url) if url.is_empty() => Ok(None),
        JsonValue::String(url) => Ok(Some(url.clone())),
        JsonValue::Array(_) => {
            let links: Vec<Link> = serde_json::from_value(value.clone())
                .map_err(|e| Error::decode(format!("invalid link objects: {e}")))?;
            Ok(extract_next_url(&links).filter(|url| !url.is_empty()))
        }
        JsonValue::Object(map) => match map.get("next") {
            Some(next) => next_from_link_value(next),
            None => Ok(None),
        },
        other => Err(Error::unexpected_type("link", json_kind(other))),
    }
}

// ============================================================================
// Marker Pages
// ============================================================================

/// A page whose successor is requested with `?marker=<last item id>`
///
/// The next URL is the current one with the marker parameter replaced. A
/// page without items has no successor.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPageBase {
    result: PageResult,
    marker_param: String,
    marker_field: String,
    items_key: Option<String>,
}

impl MarkerPageBase {
    /// Create a marker page using `marker` and the items' `id` field
    pub fn new(result: PageResult) -> Self {
        Self {
            result,
            marker_param: "marker".to_string(),
            marker_field: "id".to_string(),
            items_key: None,
        }
    }

    /// Send the marker in a different query parameter
    #[must_use]
    pub fn with_marker_param(mut self, param: impl Into<String>) -> Self {
        self.marker_param = param.into();
        self
    }

    /// Take the marker from a different item field, e.g. `name`
    #[must_use]
    pub fn with_marker_field(mut self, field: impl Into<String>) -> Self {
        self.marker_field = field.into();
        self
    }

    #[must_use]
    pub fn with_items_key(mut self, key: impl Into<String>) -> Self {
        self.items_key = Some(key.into());
        self
    }

    fn items(&self) -> Result<Option<&Vec<JsonValue>>> {
        collection_items(&self.result.body, self.items_key.as_deref())
    }
}

impl Page for MarkerPageBase {
    fn result(&self) -> &PageResult {
        &self.result
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        match self.last_marker()? {
            Some(marker) => marker_next_url(&self.result, &self.marker_param, &marker),
            None => Ok(None),
        }
    }

    fn is_empty(&self) -> Result<bool> {
        if let Some(text) = self.result.body.as_str() {
            return Ok(text.lines().all(str::is_empty));
        }
        Ok(self.items()?.map_or(true, Vec::is_empty))
    }
}

impl MarkerPage for MarkerPageBase {
    fn last_marker(&self) -> Result<Option<String>> {
        // Text listings: one item name per line
        if let Some(text) = self.result.body.as_str() {
            return Ok(text.lines().rev().find(|l| !l.is_empty()).map(str::to_string));
        }

        let Some(last) = self.items()?.and_then(|items| items.last()) else {
            return Ok(None);
        };

        let marker = match last {
            JsonValue::String(s) => s.clone(),
            JsonValue::Object(map) => match map.get(&self.marker_field) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(JsonValue::Number(n)) => n.to_string(),
                _ => {
                    return Err(Error::decode(format!(
                        "last item has no `{}` field",
                        self.marker_field
                    )))
                }
            },
            other => return Err(Error::unexpected_type("object", json_kind(other))),
        };

        Ok(Some(marker).filter(|m| !m.is_empty()))
    }
}

/// Next URL for a marker page: the current URL with `param` set to `marker`
pub fn marker_next_url(result: &PageResult, param: &str, marker: &str) -> Result<Option<String>> {
    if marker.is_empty() {
        return Ok(None);
    }
    with_query_param(&result.url, param, marker).map(Some)
}

// ============================================================================
// Offset Pages
// ============================================================================

/// A page whose successor is requested with `?offset=<items seen>`
///
/// Ends on an empty page, or when fewer items came back than the `limit`
/// query parameter asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetPageBase {
    result: PageResult,
    offset_param: String,
    limit_param: String,
    items_key: Option<String>,
}

impl OffsetPageBase {
    /// Create an offset page using the `offset` and `limit` parameters
    pub fn new(result: PageResult) -> Self {
        Self {
            result,
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
            items_key: None,
        }
    }

    /// Use different query parameter names
    #[must_use]
    pub fn with_params(mut self, offset: impl Into<String>, limit: impl Into<String>) -> Self {
        self.offset_param = offset.into();
        self.limit_param = limit.into();
        self
    }

    #[must_use]
    pub fn with_items_key(mut self, key: impl Into<String>) -> Self {
        self.items_key = Some(key.into());
        self
    }

    fn item_count(&self) -> Result<usize> {
        Ok(collection_items(&self.result.body, self.items_key.as_deref())?.map_or(0, Vec::len))
    }
}

impl Page for OffsetPageBase {
    fn result(&self) -> &PageResult {
        &self.result
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        let count = self.item_count()?;
        if count == 0 {
            return Ok(None);
        }

        let query = self.result.query()?;
        let limit = query
            .get(&self.limit_param)
            .and_then(|v| v.parse::<usize>().ok());
        if limit.is_some_and(|limit| count < limit) {
            return Ok(None);
        }

        let offset = query
            .get(&self.offset_param)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let next = offset.checked_add(count).ok_or_else(|| {
            Error::decode(format!(
                "`{}` overflows after {offset} + {count} items",
                self.offset_param
            ))
        })?;
        with_query_param(&self.result.url, &self.offset_param, &next.to_string()).map(Some)
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.item_count()? == 0)
    }
}
