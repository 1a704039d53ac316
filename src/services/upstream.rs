//! Remote REST API client for the login and refresh exchanges.
//!
//! DESIGN
//! ======
//! The dashboard never validates credentials itself; it forwards them to the
//! remote API and stores whatever tokens come back in cookies. [`AuthApi`]
//! is the seam: production uses [`HttpAuthApi`] (reqwest), tests plug in a
//! mock. Non-success statuses surface as [`ApiError::Upstream`] so the
//! status → message table in `crate::error` applies unchanged.

use serde::{Deserialize, Serialize};

use crate::config::ApiTimeouts;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Tokens and profile returned by a successful exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Present on login; present on refresh only when the API rotates it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for tokens.
    ///
    /// # Errors
    ///
    /// [`ApiError::Upstream`] for a non-success status,
    /// [`ApiError::UpstreamUnavailable`] for transport or body failures.
    async fn login(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Same as [`AuthApi::login`].
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_owned() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_for_grant<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<TokenGrant, ApiError> {
        let url = self.endpoint(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::UpstreamUnavailable(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::warn!(%url, status, "remote api rejected request");
            return Err(ApiError::Upstream { status, detail: extract_detail(&text) });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::UpstreamUnavailable(format!("unreadable grant: {e}")))
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError> {
        self.post_for_grant("auth/login", credentials).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ApiError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.post_for_grant("auth/refresh", &body).await
    }
}

/// Pull a human-readable message out of an error body: `{"detail": "..."}`,
/// `{"message": "..."}`, or `{"detail": [{"msg": "..."}]}` (validation lists).
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let field = value.get("detail").or_else(|| value.get("message"))?;
    match field {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

#[cfg(test)]
#[path = "upstream_test.rs"]
mod tests;
