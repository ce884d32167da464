// Domain API modules
// Thin, typed wrappers over the HTTP client, one per backend resource group

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod locations;
pub mod reviews;
pub mod treks;
pub mod users;
pub mod vendors;
pub mod withdrawals;

pub use admin::{AdminApi, AdminDashboard};
pub use auth::AuthApi;
pub use bookings::{Booking, BookingApi, BookingQuery, BookingStatus, CreateBookingRequest};
pub use locations::{CreateLocationRequest, Location, LocationApi};
pub use reviews::{CreateReviewRequest, Review, ReviewApi};
pub use treks::{Difficulty, Trek, TrekApi, TrekQuery, TrekSummary};
pub use users::{AccountStatus, AdminUser, UserApi, UserQuery};
pub use vendors::{
    CreateTrekRequest, UpdateTrekRequest, Vendor, VendorApi, VendorDashboard, VendorQuery,
    VendorStatus, VendorStatusUpdate,
};
pub use withdrawals::{
    BankDetails, ProcessWithdrawalRequest, Withdrawal, WithdrawalApi, WithdrawalDecision,
    WithdrawalRequest, WithdrawalStatus,
};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{ApiResponse, HttpClient, RequestOptions, ResponseBody};

/// Pagination block sent alongside list payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, alias = "totalItems", alias = "count")]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub pages: u32,
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.pagination
            .map_or(false, |p| p.pages > 0 && p.page < p.pages)
    }
}

/// A reference that the backend may or may not have populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Populated(T),
}

impl<T> Ref<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Populated(value) => Some(value),
            Ref::Id(_) => None,
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Ref::Id(id) => Some(id),
            Ref::Populated(_) => None,
        }
    }
}

/// Decode a list response whose items the backend may name `key`
///
/// Accepts `data: [...]`, `data: { items | <key>: [...] }`, `<key>: [...]` at
/// the top level, a bare array or a null payload, with the pagination block
/// either at the top level or inside `data`. Any other shape is a decode
/// error rather than an empty page.
pub(crate) fn into_page<T: DeserializeOwned>(
    response: ApiResponse,
    key: &str,
) -> Result<Page<T>, ApiError> {
    response.ensure_success()?;
    let status = response.status;
    let unrecognised = |shape: &str| {
        ApiError::decode(
            Some(status),
            format!("no '{}' list found in {}", key, shape),
        )
    };

    let (items, pagination) = match response.body {
        ResponseBody::Json(Value::Array(items)) => (Value::Array(items), None),
        ResponseBody::Json(Value::Object(mut envelope)) => {
            let top_pagination = envelope.remove("pagination");
            match envelope.remove("data") {
                Some(Value::Object(mut data)) => {
                    let pagination = data.remove("pagination").or(top_pagination);
                    let items = named_list(&mut data, key)
                        .ok_or_else(|| unrecognised("the data object"))?;
                    (items, pagination)
                }
                Some(items @ Value::Array(_)) => (items, top_pagination),
                Some(Value::Null) => match named_list(&mut envelope, key) {
                    Some(items) => (items, top_pagination),
                    None => (Value::Array(Vec::new()), top_pagination),
                },
                None => {
                    let items = named_list(&mut envelope, key)
                        .ok_or_else(|| unrecognised("the response envelope"))?;
                    (items, top_pagination)
                }
                Some(other) => {
                    return Err(ApiError::decode(
                        Some(status),
                        format!("expected a list payload, got {}", other),
                    ))
                }
            }
        }
        ResponseBody::Json(Value::Null) => (Value::Array(Vec::new()), None),
        other => {
            return Err(ApiError::decode(
                Some(status),
                format!("expected a list payload, got {:?}", other),
            ))
        }
    };

    let items: Vec<T> =
        serde_json::from_value(items).map_err(|e| ApiError::decode(Some(status), e))?;
    let pagination = match pagination {
        Some(Value::Null) | None => None,
        Some(value) => {
            Some(serde_json::from_value(value).map_err(|e| ApiError::decode(Some(status), e))?)
        }
    };

    Ok(Page { items, pagination })
}

/// Pull the list out of an object: `items`, then `key`, then the only array
/// field if there is exactly one
fn named_list(fields: &mut serde_json::Map<String, Value>, key: &str) -> Option<Value> {
    for name in ["items", key] {
        if fields.get(name).map_or(false, Value::is_array) {
            return fields.remove(name);
        }
    }

    let mut arrays = fields
        .iter()
        .filter(|(_, value)| value.is_array())
        .map(|(name, _)| name.clone());
    match (arrays.next(), arrays.next()) {
        (Some(only), None) => fields.remove(&only),
        _ => None,
    }
}

/// GET a list endpoint with query parameters
pub(crate) async fn get_page<T, Q>(
    client: &HttpClient,
    path: &str,
    key: &str,
    query: Option<&Q>,
) -> Result<Page<T>, ApiError>
where
    T: DeserializeOwned,
    Q: Serialize + ?Sized,
{
    let options = match query {
        Some(query) => RequestOptions::new().query(query)?,
        None => RequestOptions::new(),
    };
    let response = client.send(Method::GET, path, None, options).await?;
    into_page(response, key)
}
