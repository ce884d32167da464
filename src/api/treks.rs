// Trek catalogue endpoints

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use super::{get_page, Page, Ref};
use crate::api::locations::Location;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
    Extreme,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Difficult => "difficult",
            Difficulty::Extreme => "extreme",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "moderate" => Some(Difficulty::Moderate),
            "difficult" | "hard" => Some(Difficulty::Difficult),
            "extreme" => Some(Difficulty::Extreme),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trek listing as shown in the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trek {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<Ref<Location>>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(default, alias = "duration")]
    pub duration_days: Option<u32>,
    /// Kept as text so new difficulty levels still decode
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub max_group_size: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, alias = "averageRating")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: Option<String>,
}

impl Trek {
    pub fn location_name(&self) -> Option<&str> {
        match self.location.as_ref()? {
            Ref::Id(name) => Some(name),
            Ref::Populated(location) => Some(&location.name),
        }
    }
}

/// Trek reference embedded in bookings and reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrekSummary {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
}

/// Catalogue filters; unset fields are not sent
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_price_range"))]
pub struct TrekQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

fn validate_price_range(query: &TrekQuery) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            let mut error = ValidationError::new("invalid_price_range");
            error.message = Some("Minimum price cannot exceed maximum price".into());
            return Err(error);
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct TrekApi {
    client: HttpClient,
}

impl TrekApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &TrekQuery) -> Result<Page<Trek>, ApiError> {
        query.validate()?;
        get_page(&self.client, "/treks", "treks", Some(query)).await
    }

    pub async fn get(&self, id: &str) -> Result<Trek, ApiError> {
        let id = path_segment(id)?;
        self.client.get(&format!("/treks/{}", id)).await
    }

    pub async fn featured(&self) -> Result<Vec<Trek>, ApiError> {
        let page: Page<Trek> =
            get_page::<Trek, ()>(&self.client, "/treks/featured", "treks", None).await?;
        Ok(page.items)
    }
}
