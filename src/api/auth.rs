// Authentication endpoints

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use validator::Validate;

use crate::auth::models::{
    AuthPayload, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest, User,
};
use crate::error::ApiError;
use crate::http::HttpClient;

/// `/auth/me` answers with either `{ user }` or the user itself
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfilePayload {
    Wrapped { user: User },
    Bare(User),
}

impl From<ProfilePayload> for User {
    fn from(payload: ProfilePayload) -> Self {
        match payload {
            ProfilePayload::Wrapped { user } => user,
            ProfilePayload::Bare(user) => user,
        }
    }
}

#[derive(Clone)]
pub struct AuthApi {
    client: HttpClient,
}

impl AuthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        request.validate()?;
        debug!("Logging in as {}", request.email);
        let payload: AuthPayload = self.client.post("/auth/login", request).await?;
        ensure_token(payload)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        request.validate()?;
        debug!("Registering {}", request.email);
        let payload: AuthPayload = self.client.post("/auth/register", request).await?;
        ensure_token(payload)
    }

    /// Fetch the profile behind the current token
    pub async fn me(&self) -> Result<User, ApiError> {
        let payload: ProfilePayload = self.client.get("/auth/me").await?;
        Ok(payload.into())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: Value = self.client.post("/auth/logout", &json!({})).await?;
        Ok(())
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User, ApiError> {
        request.validate()?;
        let payload: ProfilePayload = self.client.put("/auth/profile", request).await?;
        Ok(payload.into())
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        request.validate()?;
        let _: Value = self.client.put("/auth/change-password", request).await?;
        Ok(())
    }
}

fn ensure_token(payload: AuthPayload) -> Result<AuthPayload, ApiError> {
    if payload.token.trim().is_empty() {
        return Err(ApiError::decode(
            None,
            "authentication response did not include a token",
        ));
    }
    Ok(payload)
}
