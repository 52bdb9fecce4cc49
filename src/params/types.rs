//! Field schema types for options structs
//!
//! An options struct describes itself as a [`FieldSet`]: one [`Field`] per
//! struct field, carrying the value plus the metadata that decides where and
//! how it is serialized.

use super::time::TimeFormat;
use crate::error::Result;
use crate::types::{JsonObject, JsonValue, StringMap};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// Field Values
// ============================================================================

/// Value of a single options field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Unset optional value
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
    /// String map, encoded as a literal map in query strings
    Map(BTreeMap<String, String>),
    Time(DateTime<Utc>),
    /// Nested options struct
    Object(FieldSet),
    /// Raw JSON passed through untouched
    Json(JsonValue),
    /// Explicitly set optional value; never zero even if the inner value is
    Set(Box<FieldValue>),
}

impl FieldValue {
    /// Whether this value counts as "unset" for required and group checks
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Uint(u) => *u == 0,
            Self::Float(f) => *f == 0.0,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Time(_) | Self::Set(_) => false,
            Self::Object(fields) => fields.is_zero(),
            Self::Json(value) => value.is_null(),
        }
    }

    /// Whether `omit_empty` drops this value from a request body
    pub fn is_empty_for_body(&self) -> bool {
        match self {
            Self::Object(_) | Self::Time(_) | Self::Set(_) => false,
            other => other.is_zero(),
        }
    }

    /// Follow explicit-set wrappers down to the concrete value
    pub fn deref_set(&self) -> &FieldValue {
        let mut current = self;
        while let Self::Set(inner) = current {
            current = inner;
        }
        current
    }

    /// Short name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Time(_) => "time",
            Self::Object(_) => "object",
            Self::Json(_) => "json",
            Self::Set(inner) => inner.kind(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        Self::Uint(value as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

impl From<BTreeMap<String, String>> for FieldValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Map(value)
    }
}

impl From<HashMap<String, String>> for FieldValue {
    fn from(value: HashMap<String, String>) -> Self {
        Self::Map(value.into_iter().collect())
    }
}

impl From<&HashMap<String, String>> for FieldValue {
    fn from(value: &HashMap<String, String>) -> Self {
        Self::Map(
            value
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

impl From<FieldSet> for FieldValue {
    fn from(value: FieldSet) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<FieldValue>> From<&Vec<T>> for FieldValue {
    fn from(value: &Vec<T>) -> Self {
        Self::List(value.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Clone + Into<FieldValue>> From<&[T]> for FieldValue {
    fn from(value: &[T]) -> Self {
        Self::List(value.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Self::Set(Box::new(inner.into())),
            None => Self::Null,
        }
    }
}

impl<T: Clone + Into<FieldValue>> From<&Option<T>> for FieldValue {
    fn from(value: &Option<T>) -> Self {
        value.clone().into()
    }
}

// ============================================================================
// Field Metadata
// ============================================================================

/// How list values are written into a query string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    /// One `name=value` pair per element
    #[default]
    Repeated,
    /// A single `name=a,b,c` pair
    CommaSeparated,
}

/// One field of an options struct
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Struct-side field name, used in errors and group references
    pub name: &'static str,
    /// Field value
    pub value: FieldValue,
    /// Query parameter name
    pub query: Option<&'static str>,
    /// JSON key in the request body
    pub json: Option<&'static str>,
    /// Drop zero values from the request body
    pub omit_empty: bool,
    /// Header name
    pub header: Option<&'static str>,
    /// Zero values are rejected
    pub required: bool,
    /// At least one of this field and the partner must be set
    pub or: Option<&'static str>,
    /// Exactly one of this field and the partner must be set
    pub xor: Option<&'static str>,
    /// Query encoding of list values
    pub list_format: ListFormat,
    /// Encoding of time values
    pub time_format: TimeFormat,
}

impl Field {
    /// Create a field with no serialization targets yet
    pub fn new(name: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            value: value.into(),
            query: None,
            json: None,
            omit_empty: false,
            header: None,
            required: false,
            or: None,
            xor: None,
            list_format: ListFormat::default(),
            time_format: TimeFormat::default(),
        }
    }

    /// Serialize as a query parameter
    #[must_use]
    pub fn query(mut self, name: &'static str) -> Self {
        self.query = Some(name);
        self
    }

    /// Serialize under a JSON key
    #[must_use]
    pub fn json(mut self, key: &'static str) -> Self {
        self.json = Some(key);
        self
    }

    /// Serialize under a JSON key, dropping zero values
    #[must_use]
    pub fn json_omit_empty(mut self, key: &'static str) -> Self {
        self.json = Some(key);
        self.omit_empty = true;
        self
    }

    /// Serialize as a request header
    #[must_use]
    pub fn header(mut self, name: &'static str) -> Self {
        self.header = Some(name);
        self
    }

    /// Reject zero values
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Require this field or `partner` to be set
    #[must_use]
    pub fn or(mut self, partner: &'static str) -> Self {
        self.or = Some(partner);
        self
    }

    /// Require exactly one of this field and `partner` to be set
    #[must_use]
    pub fn xor(mut self, partner: &'static str) -> Self {
        self.xor = Some(partner);
        self
    }

    /// Join list values with commas in query strings
    #[must_use]
    pub fn comma_separated(mut self) -> Self {
        self.list_format = ListFormat::CommaSeparated;
        self
    }

    /// Encode time values with the given layout
    #[must_use]
    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }
}

/// Ordered collection of fields describing one options struct
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a field in place
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Inline the fields of an embedded struct
    #[must_use]
    pub fn extend(mut self, other: FieldSet) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// Look up a field by its struct-side name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate over fields in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no fields were declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if every field holds a zero value
    pub fn is_zero(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_zero())
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

// ============================================================================
// Query
// ============================================================================

/// Ordered list of query parameters
///
/// A parameter may hold several values that are written comma-joined, with
/// each value escaped on its own so the separators stay literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, Vec<String>)>,
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping existing values for the same name
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), vec![value.into()]));
    }

    /// Append a parameter whose values are written as `a,b,c`
    pub fn add_joined(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.params.push((name.into(), values));
    }

    /// Replace every value of a parameter with a single value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.params.retain(|(k, _)| *k != name);
        self.params.push((name, vec![value.into()]));
    }

    /// Remove every value of a parameter
    pub fn remove(&mut self, name: &str) {
        self.params.retain(|(k, _)| k != name);
    }

    /// First value of a parameter; joined values come back comma-separated
    pub fn get(&self, name: &str) -> Option<String> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.join(","))
    }

    /// Every value of a parameter, in order
    pub fn get_all(&self, name: &str) -> Vec<String> {
        self.params
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.join(","))
            .collect()
    }

    /// Append all parameters of another query
    pub fn merge(&mut self, other: Query) {
        self.params.extend(other.params);
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parse the query component of a URL
    pub fn parse(query: &str) -> Self {
        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), vec![v.into_owned()]))
            .collect();
        Self { params }
    }

    /// Form-urlencoded query without the leading `?`
    pub fn encode(&self) -> String {
        self.params
            .iter()
            .map(|(name, values)| {
                let values: Vec<String> = values.iter().map(|v| escape(v)).collect();
                format!("{}={}", escape(name), values.join(","))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Form encoding with `~` kept literal and `*` escaped
fn escape(value: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    encoded.replace("%7E", "~").replace('*', "%2A")
}

/// Renders as `?a=b&c=d`, or nothing when empty, ready to append to a URL
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return Ok(());
        }
        write!(f, "?{}", self.encode())
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Implemented by every options struct handed to the marshaler
pub trait Options {
    /// Describe the struct's fields in declaration order
    fn fields(&self) -> FieldSet;
}

/// Options that can be rendered as a URL query string
pub trait QueryEncodable {
    /// Query string including the leading `?`, or empty
    fn to_query(&self) -> Result<String>;
}

/// Options that can be rendered as a JSON request body
pub trait BodyEncodable {
    fn to_body(&self) -> Result<JsonObject>;
}

/// Options that can be rendered as request headers
pub trait HeaderEncodable {
    fn to_headers(&self) -> Result<StringMap>;
}
