// Per-call request options: query parameters, timeout and cancellation

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

/// Timeout policy of a single call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutSetting {
    /// Use the client's configured default
    #[default]
    Default,
    /// Wait for as long as the call takes
    Disabled,
    After(Duration),
}

/// Options applied to one outbound request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) query: Vec<(String, String)>,
    pub(crate) timeout: TimeoutSetting,
    pub(crate) cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append query parameters from any serializable struct or map
    ///
    /// `None` fields are skipped and sequences become repeated keys.
    pub fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ApiError> {
        self.query.extend(query_pairs(params)?);
        Ok(self)
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = TimeoutSetting::After(limit);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = TimeoutSetting::Disabled;
        self
    }

    /// Abort the call as soon as `token` is cancelled
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn resolve_timeout(&self, default: Option<Duration>) -> Option<Duration> {
        match self.timeout {
            TimeoutSetting::Default => default,
            TimeoutSetting::Disabled => None,
            TimeoutSetting::After(limit) => Some(limit),
        }
    }
}

/// Flatten a serializable value into query string pairs
pub fn query_pairs<Q: Serialize + ?Sized>(params: &Q) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params).map_err(|e| {
        ApiError::invalid_request(format!("Failed to serialize query parameters: {}", e))
    })?;

    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(ApiError::invalid_request(
                "Query parameters must be a struct or a map",
            ))
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_to_string(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_to_string(other) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Filters {
        search: Option<String>,
        page: u32,
        featured: bool,
        difficulty: Vec<&'static str>,
        location: Option<String>,
    }

    #[test]
    fn test_query_pairs_skip_none_and_expand_sequences() {
        let filters = Filters {
            search: Some("annapurna".to_string()),
            page: 2,
            featured: true,
            difficulty: vec!["easy", "moderate"],
            location: None,
        };

        let mut pairs = query_pairs(&filters).unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("difficulty".to_string(), "easy".to_string()),
                ("difficulty".to_string(), "moderate".to_string()),
                ("featured".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "annapurna".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_reject_scalars() {
        assert!(query_pairs(&42).is_err());
        assert!(query_pairs(&Option::<Filters>::None).unwrap().is_empty());
    }

    #[test]
    fn test_timeout_resolution() {
        let default = Some(Duration::from_secs(30));
        assert_eq!(RequestOptions::new().resolve_timeout(default), default);
        assert_eq!(
            RequestOptions::new().without_timeout().resolve_timeout(default),
            None
        );
        assert_eq!(
            RequestOptions::new()
                .timeout(Duration::from_millis(250))
                .resolve_timeout(default),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_query_pair_appends() {
        let options = RequestOptions::new().query_pair("page", 3).query_pair("limit", 10);
        assert_eq!(
            options.query_params(),
            &[
                ("page".to_string(), "3".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );
    }
}
