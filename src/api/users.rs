// Admin user management endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::info;
use validator::Validate;

use super::{get_page, Page};
use crate::auth::models::{Role, User};
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Short user reference embedded in bookings and reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// User record as listed in the admin panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub status: Option<AccountStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminUser {
    /// Accounts without an explicit status are active
    pub fn is_active(&self) -> bool {
        self.status.map_or(true, |s| s == AccountStatus::Active)
    }
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct UserApi {
    client: HttpClient,
}

impl UserApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<AdminUser>, ApiError> {
        query.validate()?;
        get_page(&self.client, "/admin/users", "users", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> Result<AdminUser, ApiError> {
        let id = path_segment(id)?;
        self.client.get(&format!("/admin/users/{}", id)).await
    }

    pub async fn set_status(&self, id: &str, status: AccountStatus) -> Result<AdminUser, ApiError> {
        let id = path_segment(id)?;
        let user: AdminUser = self
            .client
            .patch(&format!("/admin/users/{}/status", id), &json!({ "status": status }))
            .await?;
        info!("User {} is now {}", id, status);
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = path_segment(id)?;
        self.client.delete(&format!("/admin/users/{}", id)).await?;
        info!("Deleted user {}", id);
        Ok(())
    }
}
