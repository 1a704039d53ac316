//! HTTP error type and the status → user-facing message table.
//!
//! DESIGN
//! ======
//! Failures from the remote API arrive as bare status codes. The dashboard
//! shows the same short message for a given status wherever it surfaces, in
//! a JSON error body or in an error toast, so the lookup lives here once.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

// =============================================================================
// CATEGORY TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    RateLimited,
    Server,
    Unexpected,
}

impl ErrorCategory {
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Validation,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            _ => Self::Unexpected,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Unexpected => "unexpected",
        }
    }

    /// Short message suitable for a toast.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::BadRequest => "invalid request",
            Self::Unauthorized => "authorization required",
            Self::Forbidden => "access denied",
            Self::NotFound => "resource not found",
            Self::Conflict => "conflicting change",
            Self::Validation => "validation error",
            Self::RateLimited => "too many requests",
            Self::Server => "server error",
            Self::Unexpected => "unexpected error",
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no active session")]
    Unauthorized,
    #[error("validation failed: {0}")]
    Validation(String),
    /// The remote API answered with a non-success status.
    #[error("remote api responded {status}")]
    Upstream { status: u16, detail: Option<String> },
    /// The remote API could not be reached or returned an unreadable body.
    #[error("remote api unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_status(self.status().as_u16())
    }

    /// Text shown to the user: the upstream detail when it sent one,
    /// otherwise the category message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(detail) | Self::Upstream { detail: Some(detail), .. } => detail.clone(),
            _ => self.category().message().to_owned(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorBody { error: self.category().code(), message: self.user_message() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
