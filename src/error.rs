// Error handling module for the trek client
// Provides the uniform ApiError produced by the HTTP wrapper and its classification

use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::config::Environment;

/// Error code attached to client-side validation failures
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";
/// Error code attached to cancelled requests
pub const CANCELLED_ERROR_CODE: &str = "REQUEST_CANCELLED";
/// Error code attached to requests that ran past their deadline
pub const TIMEOUT_ERROR_CODE: &str = "REQUEST_TIMEOUT";
/// Error code attached to responses that could not be decoded
pub const DECODE_ERROR_CODE: &str = "DECODE_ERROR";

/// How the failure came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with a non-2xx status or a `success: false` envelope
    Http,
    /// The request never produced a response
    Network,
    /// The request exceeded its timeout
    Timeout,
    /// The caller cancelled the request
    Cancelled,
    /// The response arrived but could not be decoded
    Decode,
    /// The request was rejected locally before being sent
    Validation,
}

/// Error taxonomy used at the session boundary to pick a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Auth,
    Validation,
    Server,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Server => "server",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniform error for every failed backend call
///
/// The wrapper never swallows failures: every non-2xx response, transport
/// failure, timeout or cancellation becomes one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message, safe to show to end users
    pub message: String,

    /// HTTP status of the response, absent for transport-level failures
    pub http_status: Option<u16>,

    /// Machine-readable code reported by the server or set locally
    pub error_code: Option<String>,

    /// Field-level details for validation failures
    pub validation_details: Option<Value>,

    kind: ErrorKind,
}

impl ApiError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status: None,
            error_code: None,
            validation_details: None,
            kind,
        }
    }

    /// Build an error from a non-2xx response
    ///
    /// The message comes from the body's `message` field, then from `error`
    /// when it is a plain string, falling back to `HTTP error! status: N`.
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let message = body_field(body, "message")
            .and_then(Value::as_str)
            .or_else(|| body_field(body, "error").and_then(Value::as_str))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));

        let error_code = ["code", "errorCode", "error_code"]
            .iter()
            .find_map(|name| body_field(body, name))
            .and_then(|code| match code {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let validation_details = ["errors", "details"]
            .iter()
            .find_map(|name| body_field(body, name))
            .filter(|details| !details.is_null())
            .cloned();

        Self {
            message,
            http_status: Some(status),
            error_code,
            validation_details,
            kind: ErrorKind::Http,
        }
    }

    /// A 2xx response whose envelope reported `success: false`
    pub fn rejected(status: u16, message: Option<&str>) -> Self {
        let mut err = Self::new(
            ErrorKind::Http,
            message.unwrap_or("The server rejected the request"),
        );
        err.http_status = Some(status);
        err
    }

    /// A transport failure against the given API base URL
    ///
    /// In development, failures against a local server usually mean the
    /// backend is not running or CORS blocks the origin, so the message says so.
    pub fn connection_failed(base_url: &Url, environment: Environment) -> Self {
        let message = if environment.is_development() && is_local_host(base_url) {
            format!(
                "Cannot connect to the API server at {}. Make sure the backend server is running and CORS allows this client.",
                base_url.origin().ascii_serialization()
            )
        } else {
            "Unable to connect to the server. Please check your internet connection and try again."
                .to_string()
        };
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(after: Duration) -> Self {
        let mut err = Self::new(
            ErrorKind::Timeout,
            format!("Request timed out after {}s", after.as_secs_f64()),
        );
        err.error_code = Some(TIMEOUT_ERROR_CODE.to_string());
        err
    }

    pub fn cancelled() -> Self {
        let mut err = Self::new(ErrorKind::Cancelled, "Request was cancelled");
        err.error_code = Some(CANCELLED_ERROR_CODE.to_string());
        err
    }

    pub fn decode(status: Option<u16>, reason: impl fmt::Display) -> Self {
        let mut err = Self::new(
            ErrorKind::Decode,
            format!("Failed to parse server response: {}", reason),
        );
        err.http_status = status;
        err.error_code = Some(DECODE_ERROR_CODE.to_string());
        err
    }

    /// A request rejected locally with a single message and no field details
    pub fn invalid_request(message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Validation, message);
        err.error_code = Some(VALIDATION_ERROR_CODE.to_string());
        err
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Classify the error for user-facing handling
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            ErrorKind::Network | ErrorKind::Timeout => ErrorCategory::Network,
            ErrorKind::Validation => ErrorCategory::Validation,
            ErrorKind::Cancelled | ErrorKind::Decode => ErrorCategory::Unknown,
            ErrorKind::Http => match self.http_status {
                Some(401) => ErrorCategory::Auth,
                Some(400) | Some(422) => ErrorCategory::Validation,
                Some(status) if status >= 500 => ErrorCategory::Server,
                _ => ErrorCategory::Unknown,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.http_status == Some(401)
    }
}

/// Convert validator errors into a validation-category ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut err = Self::new(ErrorKind::Validation, first_validation_message(&errors));
        err.error_code = Some(VALIDATION_ERROR_CODE.to_string());
        err.validation_details = Some(serde_json::to_value(&errors).unwrap_or(Value::Null));
        err
    }
}

/// First human-readable message, by field name so the choice is stable
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let fields = errors.field_errors();
    let mut names: Vec<_> = fields.keys().copied().collect();
    names.sort_unstable();
    names
        .into_iter()
        .flat_map(|name| fields[name].iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Request validation failed".to_string())
}

fn body_field<'a>(body: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    body.and_then(|b| b.get(name))
}

fn is_local_host(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1") | Some("0.0.0.0")
    )
}
