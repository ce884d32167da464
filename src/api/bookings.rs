// Booking endpoints

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::info;
use validator::Validate;

use super::{get_page, Page, Ref};
use crate::api::treks::TrekSummary;
use crate::api::users::UserSummary;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};
use crate::validation::{validate_not_blank, validate_not_in_past, validate_phone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether a customer may still cancel
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub trek: Option<Ref<TrekSummary>>,
    #[serde(default)]
    pub user: Option<Ref<UserSummary>>,
    #[serde(alias = "numberOfPeople", alias = "groupSize")]
    pub participants: u32,
    #[serde(default, alias = "trekDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        alias = "totalPrice",
        serialize_with = "rust_decimal::serde::float::serialize"
    )]
    pub total_amount: Decimal,
    pub status: BookingStatus,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn trek_title(&self) -> Option<&str> {
        self.trek
            .as_ref()
            .and_then(Ref::populated)
            .map(|trek| trek.title.as_str())
    }
}

/// New booking DTO
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(custom = "validate_not_blank")]
    pub trek_id: String,
    #[validate(custom = "validate_not_in_past")]
    pub start_date: NaiveDate,
    #[validate(range(min = 1, max = 50, message = "Participants must be between 1 and 50"))]
    pub participants: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_phone")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Special requests must be at most 500 characters"))]
    pub special_requests: Option<String>,
}

/// Filters for booking lists
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct BookingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct BookingApi {
    client: HttpClient,
}

impl BookingApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &CreateBookingRequest) -> Result<Booking, ApiError> {
        request.validate()?;
        let booking: Booking = self.client.post("/bookings", request).await?;
        info!(
            "Created booking {} for {} participant(s)",
            booking.id, booking.participants
        );
        Ok(booking)
    }

    /// Bookings of the signed-in customer
    pub async fn mine(&self, query: &BookingQuery) -> Result<Page<Booking>, ApiError> {
        query.validate()?;
        get_page(&self.client, "/bookings/my-bookings", "bookings", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> Result<Booking, ApiError> {
        let id = path_segment(id)?;
        self.client.get(&format!("/bookings/{}", id)).await
    }

    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> Result<Booking, ApiError> {
        let id = path_segment(id)?;
        let body = match reason {
            Some(reason) => json!({ "reason": reason }),
            None => json!({}),
        };
        let booking: Booking = self
            .client
            .put(&format!("/bookings/{}/cancel", id), &body)
            .await?;
        info!("Cancelled booking {}", booking.id);
        Ok(booking)
    }
}
