//! Tolerant deserializers for payloads produced by the cloud-script layer.
//!
//! Device and session payloads arrive as loosely typed JSON: memory sizes may
//! be numbers or strings, flags may be `1` or `"yes"`. These helpers accept any
//! scalar and never fail the surrounding struct on a shape mismatch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render a scalar as text. Empty strings, null and containers yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize any scalar as an optional string. See [`scalar_text`].
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// Like [`opt_string`], but falsy values (`false`, `0`, `""`, empty
/// containers) read as absent. Containers render as JSON text.
pub fn opt_truthy<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(truthy)
        .map(|v| scalar_text(&v).unwrap_or_else(|| v.to_string())))
}

/// Deserialize any value as a flag using [`truthy`].
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(truthy))
}

/// Deserialize to `true` whenever the field is present, whatever its value.
/// Pair with `#[serde(default)]` so an absent field reads as `false`.
pub fn present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

/// Deserialize a nested object, falling back to `T::default()` when the
/// field holds anything other than a JSON object.
pub fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => T::deserialize(value).map_err(serde::de::Error::custom),
        _ => Ok(T::default()),
    }
}
