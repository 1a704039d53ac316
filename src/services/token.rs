//! Diagnostic decoding of bearer tokens for the token debug panel.
//!
//! The token is treated as `header.payload.signature` with a base64url JSON
//! payload. Nothing here verifies a signature and nothing here feeds the
//! navigation guard; it only explains what the browser is holding.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

const PREVIEW_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("expected 3 dot-separated segments, found {0}")]
    Segments(usize),
    #[error("payload is not valid base64url")]
    Base64,
    #[error("payload is not valid JSON: {0}")]
    Json(String),
}

/// Claims the debug panel cares about. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: Option<i64>,
}

/// Decode the payload segment of a token.
///
/// # Errors
///
/// Returns [`TokenError`] when the token is not three segments, the payload
/// is not base64url (padded or not), or it does not decode to a JSON object.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(TokenError::Segments(segments.len()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|_| TokenError::Base64)?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Json(e.to_string()))
}

/// Everything the debug panel shows about one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    pub preview: String,
    pub claims: Option<Claims>,
    /// Seconds until `exp`; negative once expired, clamped to the `i64` range.
    pub expires_in_secs: Option<i64>,
    pub expired: Option<bool>,
    pub error: Option<String>,
}

impl TokenReport {
    #[must_use]
    pub fn inspect(token: &str, now_secs: i64) -> Self {
        let preview = preview(token);
        match decode_claims(token) {
            Ok(claims) => {
                let expires_in_secs = claims.exp.map(|exp| exp.saturating_sub(now_secs));
                Self {
                    preview,
                    expired: claims.exp.map(|exp| exp <= now_secs),
                    expires_in_secs,
                    claims: Some(claims),
                    error: None,
                }
            }
            Err(e) => Self { preview, claims: None, expires_in_secs: None, expired: None, error: Some(e.to_string()) },
        }
    }
}

/// First few characters followed by an ellipsis, so the panel never echoes a
/// whole credential.
#[must_use]
pub fn preview(token: &str) -> String {
    if token.chars().count() <= PREVIEW_CHARS {
        return token.to_owned();
    }
    let head: String = token.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
