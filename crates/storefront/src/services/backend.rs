//! Backend API client.
//!
//! The storefront keeps no orders, accounts or video pipeline of its own.
//! Order confirmation emails, demo requests, video analysis and account
//! login/registration are all forwarded to the backend over HTTP. Every call
//! is single-shot: non-2xx responses become [`BackendError::Api`] and nothing
//! is retried.

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use securevision_core::{DemoRequestForm, OrderEmailRequest};

use crate::config::BackendConfig;
use crate::models::CurrentUser;

/// Order confirmation email endpoint.
pub const SEND_ORDER_EMAIL_PATH: &str = "api/send-order-email";
/// Enterprise demo request endpoint.
pub const REQUEST_DEMO_PATH: &str = "api/request-demo";
/// Video analysis endpoint (multipart, field `video`).
pub const ANALYZE_VIDEO_PATH: &str = "api/analyze-video";
/// Account login endpoint.
pub const LOGIN_PATH: &str = "api/auth/login";
/// Account registration endpoint.
pub const REGISTER_PATH: &str = "api/auth/register";

/// Multipart field name carrying the uploaded video.
pub const VIDEO_FIELD: &str = "video";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Login succeeded but no access token came back.
    #[error("Login response did not include an access token")]
    MissingToken,
}

impl BackendError {
    /// Whether the backend rejected the request as unauthenticated.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Whether the backend rejected the request as invalid input (4xx other than auth).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status: 400..=499, .. })
    }
}

/// Analytics returned for an uploaded video.
///
/// Unknown fields are kept so the response can be passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub people_count: u32,
    /// Heatmap image, usually a `data:image/png;base64,...` URL.
    pub heatmap: Option<String>,
    #[serde(default)]
    pub behaviors: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Result of a successful login.
pub struct LoginSession {
    pub access_token: SecretString,
    pub user: CurrentUser,
}

impl std::fmt::Debug for LoginSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginSession")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: String,
    user: Option<CurrentUser>,
}

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("securevision-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    /// Request an order confirmation email.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend answers non-2xx.
    #[instrument(skip(self, request), fields(items = request.order_details.items.len(), total = %request.order_details.total))]
    pub async fn send_order_email(&self, request: &OrderEmailRequest) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint(SEND_ORDER_EMAIL_PATH)?)
            .json(request)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Forward an enterprise demo request.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend answers non-2xx.
    #[instrument(skip(self, form), fields(company = %form.company))]
    pub async fn request_demo(&self, form: &DemoRequestForm) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint(REQUEST_DEMO_PATH)?)
            .json(form)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Upload a video for analysis.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the backend answers non-2xx, or
    /// the response is not the expected analytics JSON.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn analyze_video(
        &self,
        file_name: String,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<VideoAnalysis, BackendError> {
        let mut part = Part::bytes(bytes).file_name(file_name);
        if let Some(mime) = content_type {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part(VIDEO_FIELD, part);

        let response = self
            .client
            .post(self.endpoint(ANALYZE_VIDEO_PATH)?)
            .multipart(form)
            .send()
            .await?;

        check_status(response)
            .await?
            .json::<VideoAnalysis>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected, the request fails, or
    /// the response lacks an access token.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginSession, BackendError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let response = self
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&body)
            .send()
            .await?;

        let login: LoginResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        if login.access_token.is_empty() {
            return Err(BackendError::MissingToken);
        }

        let user = login.user.unwrap_or_else(|| CurrentUser {
            email: email.to_string(),
            name: String::new(),
        });

        Ok(LoginSession {
            access_token: SecretString::from(login.access_token),
            user,
        })
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration or the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(), BackendError> {
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password.expose_secret(),
        });

        let response = self
            .client
            .post(self.endpoint(REGISTER_PATH)?)
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into `BackendError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull a readable message out of an error body (`{"detail": ...}` or `{"message": ...}`).
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
