// Trek marketplace API client
// Session management and typed access to the marketplace REST backend

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod ids;
pub mod store;
pub mod validation;

pub use app::TrekClient;
pub use auth::{LoginOutcome, SessionContext, SessionError, SessionState};
pub use config::{ClientConfig, ConfigError, Environment};
pub use error::{ApiError, ErrorCategory};
pub use http::{HttpClient, RequestOptions};

#[cfg(test)]
mod test_support;
