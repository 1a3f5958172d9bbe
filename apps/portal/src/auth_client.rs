use std::time::Duration;

use reqwest::Client;
use studyhub_shared::api::auth::{ApiErrorBody, AuthResponse, LoginRequest, RegisterRequest};
use studyhub_shared::api::user::UserProfile;
use studyhub_shared::error::PortalError;
use tracing::{debug, warn};

use crate::config::PortalConfig;
use crate::error::AppError;

/// Map a non-2xx response to the service's own message, or a generic one.
pub(crate) async fn error_from_response(resp: reqwest::Response, context: &str) -> AppError {
    let status = resp.status();
    let message = match resp.json::<ApiErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => format!("{context} (HTTP {status})"),
    };
    PortalError::Upstream(message).into()
}

/// HTTP client for the portal's authentication service.
///
/// Only talks to the network; adopting the returned profile into the
/// session is the caller's job.
pub struct AuthClient {
    api_base_url: String,
    http_client: Client,
}

impl AuthClient {
    pub fn new(
        api_base_url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| PortalError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_base_url: api_base_url.into(),
            http_client,
        })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, AppError> {
        Self::new(
            config.api_base_url.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    pub async fn login(&self, email: String, password: String) -> Result<UserProfile, AppError> {
        debug!(%email, "login request");
        let resp = self
            .http_client
            .post(self.api_url("/api/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = error_from_response(resp, "login failed").await;
            warn!(error = %err, "login rejected");
            return Err(err);
        }
        let body: AuthResponse = resp.json().await?;
        Ok(body.user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AppError> {
        debug!(email = %request.email, role = %request.role, "register request");
        let resp = self
            .http_client
            .post(self.api_url("/api/auth/register"))
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = error_from_response(resp, "registration failed").await;
            warn!(error = %err, "registration rejected");
            return Err(err);
        }
        let body: AuthResponse = resp.json().await?;
        Ok(body.user)
    }
}
