// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use crate::ids::deserialize_optional_id;
use crate::validation::validate_phone;

/// Marketplace roles
///
/// Unknown role strings (including the backend's legacy `user`) decode as
/// `Customer`, so a new server-side role never locks a user out of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Admin,
    Vendor,
    #[default]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::Customer => "customer",
        }
    }

    /// Landing path after a successful login for this role
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Vendor => "/vendor",
            Role::Customer => "/",
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "vendor" => Role::Vendor,
            _ => Role::Customer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compute the redirect destination for a freshly authenticated user
pub fn redirect_path_for(role: Role) -> &'static str {
    role.home_path()
}

/// User profile as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier; arrives as `id` or `_id`, string or number
    #[serde(
        default,
        alias = "_id",
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Authenticated session, persisted as `{ ...userFields, token, tokenIssuedAt }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
    pub token_issued_at: DateTime<Utc>,
    /// Informational only; expiry is enforced by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a session for a freshly issued token
    ///
    /// JWT `iat`/`exp` claims are used when present, otherwise the local clock.
    pub fn new(user: User, token: String) -> Self {
        let times = crate::auth::token::peek_token_times(&token);
        Self {
            user,
            token_issued_at: times.issued_at.unwrap_or_else(Utc::now),
            token_expires_at: times.expires_at,
            token,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.id.as_deref()
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn display_name(&self) -> &str {
        &self.user.name
    }

    /// Same token, refreshed profile
    pub fn with_user(&self, user: User) -> Self {
        Self {
            user,
            ..self.clone()
        }
    }
}

/// Login request DTO
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request DTO
#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_self_registration_role"))]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    /// Only `customer` and `vendor` may self-register
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn validate_self_registration_role(request: &RegisterRequest) -> Result<(), ValidationError> {
    match request.role {
        Some(Role::Admin) => {
            let mut error = ValidationError::new("role_not_allowed");
            error.message = Some("Admin accounts cannot be self-registered".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

/// Profile update DTO; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
}

/// Password change DTO
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Payload of a successful login or registration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}
