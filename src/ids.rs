// Backend identifiers
// The backend sends ids as `id` or `_id`, as strings or numbers; the client
// always works with strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ApiError;

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, found {}",
            other
        ))),
    }
}

/// Like `deserialize_id`, but `null`, a missing value or an empty string
/// all decode as `None`
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Check that `id` can be used as a single path segment
pub fn path_segment(id: &str) -> Result<&str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_request("Resource id must not be empty"));
    }
    if trimmed.contains(['/', '?', '#', '%']) || trimmed.chars().any(char::is_whitespace) {
        return Err(ApiError::invalid_request(format!(
            "Resource id '{}' contains characters that are not allowed",
            id
        )));
    }
    Ok(trimmed)
}
