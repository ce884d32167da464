// Session error types and user-facing failure messages

use serde_json::Value;
use thiserror::Error;

use crate::error::{ApiError, ErrorCategory};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Another sign-in request is already in progress")]
    OperationInProgress,

    #[error("You need to be logged in to do that")]
    NotAuthenticated,

    /// The session was signed out or replaced while the request was in flight
    #[error("The session ended before the request completed")]
    SessionEnded,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SessionError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::Api(err) => err.category(),
            SessionError::NotAuthenticated | SessionError::SessionEnded => ErrorCategory::Auth,
            SessionError::OperationInProgress => ErrorCategory::Unknown,
        }
    }
}

/// Session actions that report failures to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Login,
    Register,
    UpdateProfile,
    RefreshProfile,
}

impl SessionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAction::Login => "login",
            SessionAction::Register => "registration",
            SessionAction::UpdateProfile => "profile update",
            SessionAction::RefreshProfile => "profile refresh",
        }
    }
}

/// Message shown to the user when `action` fails with `err`
pub fn failure_message(action: SessionAction, err: &ApiError) -> String {
    match err.category() {
        // Connection messages are already written for end users
        ErrorCategory::Network => err.message.clone(),
        ErrorCategory::Auth => match action {
            SessionAction::Login => "Invalid email or password".to_string(),
            _ => "Your session has expired. Please log in again.".to_string(),
        },
        ErrorCategory::Validation => validation_message(err),
        ErrorCategory::Server => "Server error. Please try again later.".to_string(),
        ErrorCategory::Unknown => {
            if err.message.trim().is_empty() {
                format!("The {} failed. Please try again.", action.as_str())
            } else {
                err.message.clone()
            }
        }
    }
}

/// Server validation failures list their field messages after the summary
fn validation_message(err: &ApiError) -> String {
    let details = err
        .validation_details
        .as_ref()
        .map(detail_messages)
        .unwrap_or_default();

    let details: Vec<String> = details
        .into_iter()
        .filter(|detail| detail != &err.message)
        .collect();

    if details.is_empty() {
        err.message.clone()
    } else {
        format!("{}: {}", err.message, details.join(", "))
    }
}

/// Pull messages out of the detail shapes the backend and validator produce
///
/// Handles `["msg"]`, `[{ message | msg }]` and `{ field: [{ message }] }`.
fn detail_messages(details: &Value) -> Vec<String> {
    fn message_of(item: &Value) -> Option<String> {
        match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }

    match details {
        Value::Array(items) => items.iter().filter_map(message_of).collect(),
        Value::Object(fields) => fields
            .values()
            .flat_map(|value| match value {
                Value::Array(items) => items.iter().filter_map(message_of).collect(),
                other => message_of(other).into_iter().collect::<Vec<_>>(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
