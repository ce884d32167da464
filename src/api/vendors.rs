// Vendor endpoints
// Admin-side vendor approval plus the vendor's own portal

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use validator::Validate;

use super::{get_page, Page};
use crate::api::bookings::{Booking, BookingQuery};
use crate::api::treks::{Difficulty, Trek};
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};
use crate::validation::{validate_not_blank, validate_positive_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStatus::Pending => "pending",
            VendorStatus::Approved => "approved",
            VendorStatus::Rejected => "rejected",
            VendorStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "companyName", alias = "name")]
    pub business_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: VendorStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Vendor portal summary; missing counters read as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorDashboard {
    pub total_treks: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_earnings: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub available_balance: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct VendorQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VendorStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

/// New trek listing DTO
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrekRequest {
    #[validate(length(min = 3, max = 150, message = "Title must be between 3 and 150 characters"))]
    pub title: String,
    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,
    /// Location id
    #[validate(custom = "validate_not_blank")]
    pub location: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[validate(custom = "validate_positive_amount")]
    pub price: Decimal,
    #[validate(range(min = 1, max = 60, message = "Duration must be between 1 and 60 days"))]
    pub duration_days: u32,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 100, message = "Group size must be between 1 and 100"))]
    pub max_group_size: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Partial trek update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrekRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 150, message = "Title must be between 3 and 150 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    #[validate(custom = "validate_positive_amount")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 60, message = "Duration must be between 1 and 60 days"))]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100, message = "Group size must be between 1 and 100"))]
    pub max_group_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct VendorStatusUpdate {
    pub status: VendorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct VendorApi {
    client: HttpClient,
}

impl VendorApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub async fn list(&self, query: &VendorQuery) -> Result<Page<Vendor>, ApiError> {
        query.validate()?;
        get_page(&self.client, "/admin/vendors", "vendors", Some(query)).await
    }

    pub async fn set_status(&self, id: &str, update: &VendorStatusUpdate) -> Result<Vendor, ApiError> {
        update.validate()?;
        let id = path_segment(id)?;
        let vendor: Vendor = self
            .client
            .patch(&format!("/admin/vendors/{}/status", id), update)
            .await?;
        info!("Vendor {} is now {}", vendor.id, vendor.status);
        Ok(vendor)
    }

    // ------------------------------------------------------------------
    // Portal
    // ------------------------------------------------------------------

    pub async fn dashboard(&self) -> Result<VendorDashboard, ApiError> {
        self.client.get("/vendor/dashboard").await
    }

    pub async fn treks(&self) -> Result<Page<Trek>, ApiError> {
        get_page::<Trek, ()>(&self.client, "/vendor/treks", "treks", None).await
    }

    pub async fn create_trek(&self, request: &CreateTrekRequest) -> Result<Trek, ApiError> {
        request.validate()?;
        let trek: Trek = self.client.post("/vendor/treks", request).await?;
        info!("Created trek {} ({})", trek.title, trek.id);
        Ok(trek)
    }

    pub async fn update_trek(&self, id: &str, request: &UpdateTrekRequest) -> Result<Trek, ApiError> {
        request.validate()?;
        let id = path_segment(id)?;
        self.client.put(&format!("/vendor/treks/{}", id), request).await
    }

    pub async fn delete_trek(&self, id: &str) -> Result<(), ApiError> {
        let id = path_segment(id)?;
        self.client.delete(&format!("/vendor/treks/{}", id)).await?;
        info!("Deleted trek {}", id);
        Ok(())
    }

    pub async fn bookings(&self, query: &BookingQuery) -> Result<Page<Booking>, ApiError> {
        query.validate()?;
        get_page(&self.client, "/vendor/bookings", "bookings", Some(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn trek_request() -> CreateTrekRequest {
        CreateTrekRequest {
            title: "Manaslu Circuit".to_string(),
            description: "Remote circuit around the eighth highest peak".to_string(),
            location: "l1".to_string(),
            price: dec!(1800.50),
            duration_days: 14,
            difficulty: Difficulty::Difficult,
            max_group_size: 12,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_create_trek_serializes_price_as_number() {
        let request = trek_request();
        assert!(request.validate().is_ok());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["price"], json!(1800.5));
        assert_eq!(value["durationDays"], 14);
        assert_eq!(value["difficulty"], "difficult");
        assert!(value.get("images").is_none());
    }

    #[test]
    fn test_create_trek_rejects_non_positive_price() {
        let request = CreateTrekRequest {
            price: dec!(0),
            duration_days: 0,
            ..trek_request()
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("duration_days"));
    }

    #[test]
    fn test_update_trek_sends_only_changes() {
        let update = UpdateTrekRequest {
            price: Some(dec!(950)),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"price": 950.0}));

        let negative = UpdateTrekRequest {
            price: Some(dec!(-1)),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_dashboard_defaults_missing_counters() {
        let dashboard: VendorDashboard =
            serde_json::from_value(json!({"totalTreks": 4, "totalEarnings": "1520.75"})).unwrap();
        assert_eq!(dashboard.total_treks, 4);
        assert_eq!(dashboard.total_bookings, 0);
        assert_eq!(dashboard.total_earnings, dec!(1520.75));
        assert_eq!(dashboard.available_balance, Decimal::ZERO);
    }
}
