//! Session cookies and the request-scoped session context.
//!
//! ARCHITECTURE
//! ============
//! Three cookies make up a dashboard session: `access_token` (bearer token
//! for the remote API), `refresh_token`, and `user` (display profile, base64url
//! JSON). Only the presence of `access_token` matters for navigation; the
//! tokens themselves stay opaque here.

use std::fmt::Write;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use time::Duration;

use crate::config::CookieSettings;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const USER_COOKIE: &str = "user";
pub const TOAST_CLIENT_COOKIE: &str = "toast_client";

/// Cookies removed on logout and on a manual debug reset.
pub const SESSION_COOKIES: [&str; 3] = [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, USER_COOKIE];

// =============================================================================
// SESSION CONTEXT
// =============================================================================

/// What a single request knows about its session, read once from the jar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionContext {
    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self {
            access_token: non_empty(jar, ACCESS_TOKEN_COOKIE),
            refresh_token: non_empty(jar, REFRESH_TOKEN_COOKIE),
        }
    }

    /// Presence, not validity. An empty value counts as absent.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.access_token.is_some()
    }
}

fn non_empty(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// COOKIE BUILDERS
// =============================================================================

fn base_cookie(name: &'static str, value: String, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .build()
}

#[must_use]
pub fn access_cookie(token: String, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(ACCESS_TOKEN_COOKIE, token, settings);
    cookie.set_http_only(true);
    cookie.set_max_age(Duration::seconds(settings.access_max_age_secs));
    cookie
}

#[must_use]
pub fn refresh_cookie(token: String, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(REFRESH_TOKEN_COOKIE, token, settings);
    cookie.set_http_only(true);
    cookie.set_max_age(Duration::seconds(settings.refresh_max_age_secs));
    cookie
}

/// Readable by page scripts so the header can show who is signed in.
#[must_use]
pub fn user_cookie(user: &serde_json::Value, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(USER_COOKIE, encode_user(user), settings);
    cookie.set_max_age(Duration::seconds(settings.access_max_age_secs));
    cookie
}

#[must_use]
pub fn toast_client_cookie(key: String, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = base_cookie(TOAST_CLIENT_COOKIE, key, settings);
    cookie.set_http_only(true);
    cookie
}

/// Expire every session cookie. Cookies not in the jar are expired anyway,
/// so a reset always overwrites whatever the browser holds.
#[must_use]
pub fn clear_session(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    SESSION_COOKIES.iter().fold(jar, |jar, &name| {
        let mut cookie = base_cookie(name, String::new(), settings);
        cookie.set_max_age(Duration::ZERO);
        jar.add(cookie)
    })
}

/// JSON profile → base64url so it is a valid cookie value.
#[must_use]
pub fn encode_user(user: &serde_json::Value) -> String {
    URL_SAFE_NO_PAD.encode(user.to_string())
}

/// Inverse of [`encode_user`]; `None` for anything malformed.
#[must_use]
pub fn decode_user(raw: &str) -> Option<serde_json::Value> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&bytes).ok()
}

// =============================================================================
// CLIENT KEYS
// =============================================================================

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 16-byte hex key identifying one browser for toast delivery.
#[must_use]
pub fn generate_client_key() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
