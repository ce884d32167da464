// Location endpoints

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{get_page, Page};
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub trek_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct LocationApi {
    client: HttpClient,
}

impl LocationApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Location>, ApiError> {
        let page: Page<Location> =
            get_page::<Location, ()>(&self.client, "/locations", "locations", None).await?;
        Ok(page.items)
    }

    /// Admin only
    pub async fn create(&self, request: &CreateLocationRequest) -> Result<Location, ApiError> {
        request.validate()?;
        let location: Location = self.client.post("/admin/locations", request).await?;
        info!("Created location {} ({})", location.name, location.id);
        Ok(location)
    }

    /// Admin only
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = path_segment(id)?;
        self.client.delete(&format!("/admin/locations/{}", id)).await
    }
}
