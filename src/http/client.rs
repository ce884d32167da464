// HTTP request wrapper
// Single choke point for every outbound call to the marketplace backend

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::{ClientConfig, Environment};
use crate::error::ApiError;
use crate::http::request::RequestOptions;
use crate::http::response::{ApiResponse, ResponseBody};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Backend client shared by the session context and every API module
///
/// Cloning is cheap; clones share the connection pool and the token slot, so a
/// token set after login is seen by every API module.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Url,
    environment: Environment,
    default_timeout: Option<Duration>,
    token: Arc<RwLock<Option<String>>>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("trek-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner,
            base_url: config.api_base_url.clone(),
            environment: config.environment,
            default_timeout: config.request_timeout,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Attach `token` as the bearer credential of every later request
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Resolve an endpoint path against the API base URL
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path)).map_err(|e| {
            ApiError::invalid_request(format!("Invalid endpoint path '{}': {}", path, e))
        })
    }

    /// Issue a request and return the raw successful response
    ///
    /// Non-2xx statuses, transport failures, timeouts and cancellation all
    /// come back as `Err(ApiError)`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint_url(path)?;
        let request_id = Uuid::new_v4();

        if options.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            debug!("Request {} {} cancelled before sending", method, url.path());
            return Err(ApiError::cancelled());
        }

        let mut builder = self
            .inner
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(token) = self.token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(request_id = %request_id, "{} {}", method, url.path());

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| self.transport_error(&method, &url, &e))?;
            let status = response.status();
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.to_ascii_lowercase().contains("json"));
            let bytes = response
                .bytes()
                .await
                .map_err(|e| self.transport_error(&method, &url, &e))?;
            Ok::<_, ApiError>((status, is_json, bytes))
        };

        let timeout = options.resolve_timeout(self.default_timeout);
        let bounded = async {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, exchange).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(request_id = %request_id, "{} {} timed out after {:?}", method, url.path(), limit);
                        Err(ApiError::timeout(limit))
                    }
                },
                None => exchange.await,
            }
        };

        let outcome = match &options.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!(request_id = %request_id, "{} {} cancelled", method, url.path());
                        Err(ApiError::cancelled())
                    }
                    result = bounded => result,
                }
            }
            None => bounded.await,
        };

        let (status, is_json, bytes) = outcome?;
        self.finish_response(&method, &url, status, is_json, &bytes)
    }

    fn finish_response(
        &self,
        method: &Method,
        url: &Url,
        status: StatusCode,
        is_json: bool,
        bytes: &[u8],
    ) -> Result<ApiResponse, ApiError> {
        if !status.is_success() {
            // Error bodies are best effort; a garbled body must not hide the status
            let body = ResponseBody::from_bytes(is_json, bytes).ok();
            let err = ApiError::from_response(status.as_u16(), body.as_ref().and_then(ResponseBody::as_json));
            if status.is_server_error() {
                error!("{} {} failed with {}: {}", method, url.path(), status, err.message);
            } else {
                debug!("{} {} rejected with {}: {}", method, url.path(), status, err.message);
            }
            return Err(err);
        }

        let body = ResponseBody::from_bytes(is_json, bytes)
            .map_err(|e| ApiError::decode(Some(status.as_u16()), e))?;

        debug!("{} {} -> {}", method, url.path(), status);
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn transport_error(&self, method: &Method, url: &Url, err: &reqwest::Error) -> ApiError {
        warn!("{} {} failed before a response arrived: {}", method, url.path(), err);
        ApiError::connection_failed(&self.base_url, self.environment)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with(path, RequestOptions::default()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, None, options).await?.into_data()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with(path, body, RequestOptions::default()).await
    }

    pub async fn post_with<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = json_body(body)?;
        self.send(Method::POST, path, Some(&body), options)
            .await?
            .into_data()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = json_body(body)?;
        self.send(Method::PUT, path, Some(&body), RequestOptions::default())
            .await?
            .into_data()
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = json_body(body)?;
        self.send(Method::PATCH, path, Some(&body), RequestOptions::default())
            .await?
            .into_data()
    }

    /// DELETE and check the envelope; the payload, if any, is discarded
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None, RequestOptions::default())
            .await?
            .ensure_success()
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::invalid_request(format!("Failed to serialize request body: {}", e)))
}
