// Review endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{get_page, Page, Ref};
use crate::api::treks::TrekSummary;
use crate::api::users::UserSummary;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::ids::{deserialize_id, path_segment};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub trek: Option<Ref<TrekSummary>>,
    #[serde(default)]
    pub user: Option<Ref<UserSummary>>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn author_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(Ref::populated)
            .map(|user| user.name.as_str())
    }
}

/// Review submission DTO
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[validate(custom = "validate_not_blank")]
    pub trek_id: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Clone)]
pub struct ReviewApi {
    client: HttpClient,
}

impl ReviewApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn for_trek(&self, trek_id: &str) -> Result<Page<Review>, ApiError> {
        let trek_id = path_segment(trek_id)?;
        let path = format!("/treks/{}/reviews", trek_id);
        get_page::<Review, ()>(&self.client, &path, "reviews", None).await
    }

    pub async fn create(&self, request: &CreateReviewRequest) -> Result<Review, ApiError> {
        request.validate()?;
        let review: Review = self.client.post("/reviews", request).await?;
        info!("Posted review {} with rating {}", review.id, review.rating);
        Ok(review)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = path_segment(id)?;
        self.client.delete(&format!("/reviews/{}", id)).await
    }
}
