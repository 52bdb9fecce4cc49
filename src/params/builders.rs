//! Serializers turning an options field set into query strings, request
//! bodies and headers

use super::types::{Field, FieldSet, FieldValue, ListFormat, Options, Query};
use crate::error::{Error, GroupRule, Result};
use crate::types::{JsonObject, JsonValue, StringMap};
use serde_json::Number;

// ============================================================================
// Query String
// ============================================================================

/// Build a query string from every field carrying a query name
///
/// Parameters appear in field declaration order. A required field holding a
/// zero value fails with [`Error::MissingInput`] naming the field.
pub fn build_query_string(opts: &impl Options) -> Result<Query> {
    let fields = opts.fields();
    let mut query = Query::new();

    for field in &fields {
        let Some(name) = field.query else {
            continue;
        };

        if field.value.is_zero() {
            if field.required {
                return Err(Error::missing_input_with_info(
                    field.name,
                    "Required query parameter not set",
                ));
            }
            continue;
        }

        add_query_value(&mut query, name, field)?;
    }

    Ok(query)
}

fn add_query_value(query: &mut Query, name: &str, field: &Field) -> Result<()> {
    match field.value.deref_set() {
        FieldValue::Null => {}
        FieldValue::List(items) => {
            let values = items
                .iter()
                .map(|item| scalar_string(field, item))
                .collect::<Result<Vec<_>>>()?;
            match field.list_format {
                ListFormat::CommaSeparated => query.add_joined(name, values),
                ListFormat::Repeated => {
                    for value in values {
                        query.add(name, value);
                    }
                }
            }
        }
        FieldValue::Map(map) => {
            let entries: Vec<String> = map.iter().map(|(k, v)| format!("'{k}':'{v}'")).collect();
            query.add(name, format!("{{{}}}", entries.join(", ")));
        }
        other => query.add(name, scalar_string(field, other)?),
    }
    Ok(())
}

/// Render a scalar value as text; lists, maps and objects are rejected
fn scalar_string(field: &Field, value: &FieldValue) -> Result<String> {
    match value.deref_set() {
        FieldValue::String(s) => Ok(s.clone()),
        FieldValue::Int(i) => Ok(i.to_string()),
        FieldValue::Uint(u) => Ok(u.to_string()),
        FieldValue::Float(f) => Ok(f.to_string()),
        FieldValue::Bool(b) => Ok(b.to_string()),
        FieldValue::Time(t) => Ok(field.time_format.format(t)),
        FieldValue::Json(JsonValue::String(s)) => Ok(s.clone()),
        FieldValue::Json(JsonValue::Number(n)) => Ok(n.to_string()),
        FieldValue::Json(JsonValue::Bool(b)) => Ok(b.to_string()),
        other => Err(Error::invalid_options(format!(
            "field {} holds a {} value where a scalar is expected",
            field.name,
            other.kind()
        ))),
    }
}

// ============================================================================
// Request Body
// ============================================================================

/// Build a JSON request body from every field carrying a JSON key
///
/// Required, `xor` and `or` constraints are checked first, including nested
/// options; nothing is serialized if any check fails. A non-empty `root`
/// wraps the result as `{root: {...}}`.
pub fn build_request_body(opts: &impl Options, root: &str) -> Result<JsonObject> {
    let fields = opts.fields();
    validate(&fields)?;

    let body = object_from_fields(&fields);
    if root.is_empty() {
        return Ok(body);
    }

    let mut wrapped = JsonObject::new();
    wrapped.insert(root.to_string(), JsonValue::Object(body));
    Ok(wrapped)
}

/// Check required and field-group constraints, recursing into nested options
pub fn validate(fields: &FieldSet) -> Result<()> {
    for field in fields {
        let zero = field.value.is_zero();

        if field.required && zero {
            return Err(Error::missing_input(field.name));
        }

        if let Some(partner) = field.xor {
            let partner_zero = partner_field(fields, field, partner)?.value.is_zero();
            if zero == partner_zero {
                return Err(Error::field_group(field.name, partner, GroupRule::ExactlyOne));
            }
        }

        if let Some(partner) = field.or {
            if zero && partner_field(fields, field, partner)?.value.is_zero() {
                return Err(Error::field_group(field.name, partner, GroupRule::AtLeastOne));
            }
        }

        match field.value.deref_set() {
            FieldValue::Object(nested) if !zero => validate(nested)?,
            FieldValue::List(items) => {
                for item in items {
                    if let FieldValue::Object(nested) = item.deref_set() {
                        validate(nested)?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn partner_field<'a>(fields: &'a FieldSet, field: &Field, partner: &str) -> Result<&'a Field> {
    fields.get(partner).ok_or_else(|| {
        Error::invalid_options(format!(
            "field {} refers to unknown field {partner}",
            field.name
        ))
    })
}

fn object_from_fields(fields: &FieldSet) -> JsonObject {
    let mut object = JsonObject::new();
    for field in fields {
        let Some(key) = field.json else {
            continue;
        };
        if field.omit_empty && field.value.is_empty_for_body() {
            continue;
        }
        object.insert(key.to_string(), to_json(field, &field.value));
    }
    object
}

fn to_json(field: &Field, value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Null => JsonValue::Null,
        FieldValue::Bool(b) => JsonValue::Bool(*b),
        FieldValue::Int(i) => JsonValue::Number((*i).into()),
        FieldValue::Uint(u) => JsonValue::Number((*u).into()),
        FieldValue::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        FieldValue::String(s) => JsonValue::String(s.clone()),
        FieldValue::List(items) => {
            JsonValue::Array(items.iter().map(|item| to_json(field, item)).collect())
        }
        FieldValue::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
                .collect(),
        ),
        FieldValue::Time(t) => JsonValue::String(field.time_format.format(t)),
        FieldValue::Object(nested) => JsonValue::Object(object_from_fields(nested)),
        FieldValue::Json(raw) => raw.clone(),
        FieldValue::Set(inner) => to_json(field, inner),
    }
}

// ============================================================================
// Headers
// ============================================================================

/// Build a header map from every field carrying a header name
pub fn build_headers(opts: &impl Options) -> Result<StringMap> {
    let fields = opts.fields();
    let mut headers = StringMap::new();

    for field in &fields {
        let Some(name) = field.header else {
            continue;
        };

        if field.value.is_zero() {
            if field.required {
                return Err(Error::missing_input_with_info(
                    field.name,
                    "Required header not set",
                ));
            }
            continue;
        }

        if matches!(field.value.deref_set(), FieldValue::Null) {
            continue;
        }
        headers.insert(name.to_string(), scalar_string(field, &field.value)?);
    }

    Ok(headers)
}

// ============================================================================
// Helpers
// ============================================================================

/// `None` for an empty string, otherwise the owned string
pub fn maybe_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// `None` for zero, otherwise the value
pub fn maybe_int(value: i64) -> Option<i64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}
