// Remote API boundary
// Authentication endpoints of the booking service, consumed by the auth and session flows

use crate::config::ClientConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    Rejected { status_code: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl ApiError {
    /// Text for the error notification. Server rejections carry their own
    /// message; everything else falls back to the error description.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    Authenticated { user_id: String },
    Unauthenticated,
}

#[async_trait]
pub trait RemoteApi: Send + Sync + 'static {
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    async fn sign_in(&self, request: &SignInRequest) -> Result<(), ApiError>;

    // Transport failures are errors; an invalid or missing token is not
    async fn validate_token(&self) -> Result<TokenValidation, ApiError>;

    async fn sign_out(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateTokenBody {
    user_id: String,
}

/// reqwest-backed client. The auth cookie set by the login endpoint lives in
/// the client's cookie store and is sent with every later request.
pub struct HttpRemoteApi {
    http: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpRemoteApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::ClientError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.request_timeout_ms,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout_ms)
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }

    // Non-2xx bodies are `{ "message": ... }`
    async fn expect_success(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<MessageBody>().await {
            Ok(body) => body.message.unwrap_or_default(),
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "error response without message body");
                String::new()
            }
        };
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            message
        };

        Err(ApiError::Rejected {
            status_code: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        debug!(email = %request.email, "POST /api/users/register");
        let response = self
            .http
            .post(self.endpoint("/api/users/register"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.expect_success(response).await
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<(), ApiError> {
        debug!(email = %request.email, "POST /api/auth/login");
        let response = self
            .http
            .post(self.endpoint("/api/auth/login"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.expect_success(response).await
    }

    async fn validate_token(&self) -> Result<TokenValidation, ApiError> {
        let response = self
            .http
            .get(self.endpoint("/api/auth/validate-token"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "token rejected");
            return Ok(TokenValidation::Unauthenticated);
        }

        let body = response
            .json::<ValidateTokenBody>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(TokenValidation::Authenticated {
            user_id: body.user_id,
        })
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        debug!("POST /api/auth/logout");
        let response = self
            .http
            .post(self.endpoint("/api/auth/logout"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.expect_success(response).await
    }
}
