//! Forgiving field deserializers for API payloads.
//!
//! The summary endpoint is not strict about its JSON: resource amounts show up
//! as numbers, numeric strings, `null`, or not at all, and labels sometimes
//! arrive as nested objects. These helpers fold every such shape into a plain
//! Rust value so nothing downstream has to handle malformed input.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value to a resource amount.
///
/// Finite numbers pass through and numeric strings are parsed. Anything else
/// counts as `0`.
pub fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    amount.filter(|a| a.is_finite()).unwrap_or(0.0)
}

/// Coerce an arbitrary JSON value to a non-negative whole count.
///
/// Used for week numbers and head counts. Negative, fractional, or
/// non-numeric values become `0`.
pub fn coerce_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    }
}

/// Deserialize a resource amount (`food`, `wood`, `stone`, `gold`).
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_amount).unwrap_or(0.0))
}

/// Deserialize a week number or head count.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_count).unwrap_or(0))
}

/// Deserialize an identifier that may be a string or a number.
///
/// Blank strings are treated as absent.
pub fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Deserialize an optional label such as an alliance name.
///
/// Accepts a bare string or an embedded object carrying `name` or `tag`.
pub fn label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(label_of))
}

fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("tag"))
            .and_then(label_of),
        _ => None,
    }
}

/// Deserialize a required display string, defaulting to empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
