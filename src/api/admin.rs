// Admin dashboard endpoint

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::bookings::Booking;
use crate::error::ApiError;
use crate::http::HttpClient;

/// Platform-wide counters; missing fields read as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_vendors: u64,
    pub total_treks: u64,
    pub total_bookings: u64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_revenue: Decimal,
    pub pending_vendors: u64,
    pub pending_withdrawals: u64,
    pub recent_bookings: Vec<Booking>,
}

impl AdminDashboard {
    /// Items waiting on an admin decision
    pub fn pending_actions(&self) -> u64 {
        self.pending_vendors + self.pending_withdrawals
    }
}

#[derive(Clone)]
pub struct AdminApi {
    client: HttpClient,
}

impl AdminApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> Result<AdminDashboard, ApiError> {
        self.client.get("/admin/dashboard").await
    }
}
