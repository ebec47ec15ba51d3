//! Lenient accessors over loosely-typed JSON objects.
//!
//! Report content is AI-generated: numbers arrive as strings, lists as
//! single values, dates in several formats. Every accessor returns `None`
//! (or an empty list) rather than failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

/// Non-null value at `key`.
pub(crate) fn get<'a>(obj: Option<&'a Object>, key: &str) -> Option<&'a Value> {
    obj.and_then(|o| o.get(key)).filter(|v| !v.is_null())
}

/// Nested object at `key`. Non-object values yield `None`.
pub(crate) fn object<'a>(obj: Option<&'a Object>, key: &str) -> Option<&'a Object> {
    get(obj, key).and_then(Value::as_object)
}

/// Whether `key` holds an object with at least one field.
pub(crate) fn is_present(obj: &Object, key: &str) -> bool {
    object(Some(obj), key).is_some_and(|o| !o.is_empty())
}

/// Non-blank string at `key`; numbers are rendered as text.
pub(crate) fn string(obj: Option<&Object>, key: &str) -> Option<String> {
    match get(obj, key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number at `key`, accepting numeric strings.
pub(crate) fn f64_field(obj: Option<&Object>, key: &str) -> Option<f64> {
    let n = match get(obj, key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-negative count at `key`. Fractions are rounded.
pub(crate) fn u32_field(obj: Option<&Object>, key: &str) -> Option<u32> {
    let n = f64_field(obj, key)?;
    if n < 0.0 {
        return None;
    }
    let rounded = n.round();
    (rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
}

/// Boolean at `key`, accepting `"true"`/`"yes"` and non-zero numbers.
pub(crate) fn bool_field(obj: Option<&Object>, key: &str) -> Option<bool> {
    match get(obj, key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// List of strings at `key`. A lone string becomes a one-element list;
/// blank and non-scalar entries are dropped.
pub(crate) fn string_list(obj: Option<&Object>, key: &str) -> Vec<String> {
    match get(obj, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Object elements of the array at `key`; anything else is skipped.
pub(crate) fn records<'a>(obj: Option<&'a Object>, key: &str) -> Vec<&'a Object> {
    match get(obj, key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// Calendar date at `key`.
pub(crate) fn date(obj: Option<&Object>, key: &str) -> Option<NaiveDate> {
    let raw = string(obj, key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(&raw).map(|ts| ts.date_naive()))
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
