//! Deserialization helpers for the loosely-typed upstream payloads.
//!
//! The ERP endpoints are inconsistent about numeric fields: the same column
//! arrives as a JSON number on one row and a numeric string (`"1234.56"`) on
//! the next. These adapters accept either form so the typed row structs can
//! stay honest about what they hold. `null` reads as the zero value, matching
//! what the endpoints mean by it; anything non-numeric is a decode error
//! rather than a silent `NaN`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Accept a JSON number or a numeric string as `f64`. `null` reads as 0.0.
pub fn flex_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    match &value {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range for f64")),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("expected a numeric string, got \"{s}\""))
        }),
        other => Err(serde::de::Error::custom(format!(
            "expected number or numeric string, got {}",
            type_label(other)
        ))),
    }
}

/// Accept a JSON number or a numeric string as `Option<f64>`. `null` is `None`.
pub fn flex_opt_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    match &value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("number out of range for f64")),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("expected a numeric string, got \"{s}\""))
        }),
        other => Err(serde::de::Error::custom(format!(
            "expected number or numeric string, got {}",
            type_label(other)
        ))),
    }
}

/// Accept a JSON integer or an integer string as `i64`. `null` reads as 0.
pub fn flex_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    match &value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            // Some drivers emit ids as floats (42.0); accept when integral.
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(serde::de::Error::custom("number is not a valid integer")),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(serde::de::Error::custom(format!(
                    "expected an integer string, got \"{s}\""
                ))),
            }
        }
        other => Err(serde::de::Error::custom(format!(
            "expected integer or integer string, got {}",
            type_label(other)
        ))),
    }
}

/// Accept a JSON string or number as `String`. `null` reads as empty.
///
/// Product and group codes arrive as either form depending on the endpoint.
pub fn flex_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            type_label(&other)
        ))),
    }
}

/// Decode a list payload into typed rows.
///
/// A non-array payload (some endpoints answer HTTP 200 with an error object)
/// yields an empty list. Rows that fail to decode are dropped with a warning
/// instead of failing the whole page.
pub fn rows_from_value<T: DeserializeOwned>(value: Value, context: &str) -> Vec<T> {
    let Value::Array(items) = value else {
        log::warn!(
            "{context}: expected a JSON array, got {}; returning no rows",
            type_label(&value)
        );
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value(item) {
            Ok(row) => rows.push(row),
            Err(e) => log::warn!("{context}: dropping row that failed to decode: {e}"),
        }
    }
    rows
}
