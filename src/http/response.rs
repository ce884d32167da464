// Response bodies and the `{ success, data, message }` envelope

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Body of a backend response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Content type indicated JSON; an empty body parses as `null`
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn from_bytes(is_json: bool, bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if !is_json {
            return Ok(ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()));
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ResponseBody::Json(Value::Null));
        }
        serde_json::from_slice(bytes).map(ResponseBody::Json)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// Successful (2xx) response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Envelope `message`, if any
    pub fn message(&self) -> Option<&str> {
        self.body
            .as_json()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
    }

    /// Fail when the envelope reports `success: false`
    pub fn ensure_success(&self) -> Result<(), ApiError> {
        let rejected = self
            .body
            .as_json()
            .and_then(|body| body.get("success"))
            .map_or(false, |success| success == &Value::Bool(false));

        if rejected {
            return Err(ApiError::rejected(self.status, self.message()));
        }
        Ok(())
    }

    /// Decode the payload into `T`
    ///
    /// Objects carrying a `data` field yield that field; anything else is
    /// decoded as a whole. Plain text decodes as a JSON string.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        self.ensure_success()?;

        let status = self.status;
        let value = match self.body {
            ResponseBody::Json(Value::Object(mut map)) => match map.remove("data") {
                Some(data) => data,
                None => Value::Object(map),
            },
            ResponseBody::Json(other) => other,
            ResponseBody::Text(text) if text.trim().is_empty() => Value::Null,
            ResponseBody::Text(text) => Value::String(text),
        };

        serde_json::from_value(value).map_err(|e| ApiError::decode(Some(status), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Trek {
        id: String,
        title: String,
    }

    fn json_response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            status,
            body: ResponseBody::Json(body),
        }
    }

    #[test]
    fn test_envelope_data_is_unwrapped() {
        let response = json_response(
            200,
            json!({"success": true, "data": {"id": "t1", "title": "Everest Base Camp"}}),
        );
        let trek: Trek = response.into_data().unwrap();
        assert_eq!(trek.title, "Everest Base Camp");
    }

    #[test]
    fn test_bare_bodies_decode_whole() {
        let response = json_response(200, json!({"id": "t2", "title": "Langtang"}));
        let trek: Trek = response.into_data().unwrap();
        assert_eq!(trek.id, "t2");

        let response = json_response(200, json!([1, 2, 3]));
        let numbers: Vec<u32> = response.into_data().unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_success_false_is_rejected() {
        let response = json_response(200, json!({"success": false, "message": "Trek is full"}));
        let err = response.into_data::<Value>().unwrap_err();
        assert_eq!(err.message, "Trek is full");
        assert_eq!(err.http_status, Some(200));
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn test_decode_failure_keeps_status() {
        let response = json_response(201, json!({"data": {"id": 5}}));
        let err = response.into_data::<Trek>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.http_status, Some(201));
    }

    #[test]
    fn test_text_bodies() {
        let response = ApiResponse {
            status: 200,
            body: ResponseBody::Text("pong".to_string()),
        };
        assert_eq!(response.into_data::<String>().unwrap(), "pong");

        let response = ApiResponse {
            status: 204,
            body: ResponseBody::Text(String::new()),
        };
        assert_eq!(response.into_data::<Option<Trek>>().unwrap(), None);
    }

    #[test]
    fn test_body_parsing() {
        assert_eq!(
            ResponseBody::from_bytes(true, b"  ").unwrap(),
            ResponseBody::Json(Value::Null)
        );
        assert_eq!(
            ResponseBody::from_bytes(false, b"<html>").unwrap(),
            ResponseBody::Text("<html>".to_string())
        );
        assert!(ResponseBody::from_bytes(true, b"{oops").is_err());
    }
}
