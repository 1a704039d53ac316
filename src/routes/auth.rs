//! Auth routes: login/refresh proxy, logout, session probe, token debug.

use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use toasts::ToastKind;

use crate::error::{ApiError, ErrorCategory};
use crate::routes::toasts::toast_client;
use crate::services::guard::{Decision, decide};
use crate::services::session::{self, SessionContext, USER_COOKIE};
use crate::services::token::TokenReport;
use crate::services::upstream::Credentials;
use crate::state::AppState;

// =============================================================================
// SESSION EXTRACTOR
// =============================================================================

/// Reads the session cookies once per request. Never rejects: a missing
/// cookie is simply "no session".
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_jar(&CookieJar::from_headers(&parts.headers)))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: forward credentials, store the granted tokens.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(credentials): Json<Credentials>) -> Response {
    let (jar, client) = toast_client(jar, &state.config);

    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        let err = ApiError::Validation("username and password are required".into());
        state.toasts.notify(&client, ToastKind::Error, err.user_message());
        return (jar, err).into_response();
    }

    let grant = match state.auth_api.login(&credentials).await {
        Ok(grant) => grant,
        Err(e) => {
            tracing::warn!(username = %credentials.username, error = %e, "login failed");
            state.toasts.notify(&client, ToastKind::Error, e.user_message());
            return (jar, e).into_response();
        }
    };

    let cookies = &state.config.cookies;
    let mut jar = jar.add(session::access_cookie(grant.access_token, cookies));
    if let Some(refresh_token) = grant.refresh_token {
        jar = jar.add(session::refresh_cookie(refresh_token, cookies));
    }
    if let Some(user) = &grant.user {
        jar = jar.add(session::user_cookie(user, cookies));
    }

    tracing::info!(username = %credentials.username, "login succeeded");
    state.toasts.notify(&client, ToastKind::Success, "Signed in");
    (jar, Json(serde_json::json!({ "user": grant.user }))).into_response()
}

/// `POST /api/auth/refresh`: trade the refresh cookie for a new access token.
/// A rejected refresh token ends the session.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar, ctx: SessionContext) -> Response {
    let Some(refresh_token) = ctx.refresh_token else {
        return (jar, ApiError::Unauthorized).into_response();
    };

    let cookies = &state.config.cookies;
    match state.auth_api.refresh(&refresh_token).await {
        Ok(grant) => {
            let mut jar = jar.add(session::access_cookie(grant.access_token, cookies));
            if let Some(rotated) = grant.refresh_token {
                jar = jar.add(session::refresh_cookie(rotated, cookies));
            }
            tracing::debug!("access token refreshed");
            (jar, StatusCode::NO_CONTENT).into_response()
        }
        Err(e) if e.category() == ErrorCategory::Unauthorized => {
            tracing::info!(error = %e, "refresh rejected, clearing session");
            (session::clear_session(jar, cookies), e).into_response()
        }
        Err(e) => (jar, e).into_response(),
    }
}

/// `POST /api/auth/logout`: drop all session cookies. Toasts left over from
/// the session are discarded before the sign-out notice.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, client) = toast_client(jar, &state.config);
    let jar = session::clear_session(jar, &state.config.cookies);
    state.toasts.release(&client);
    tracing::info!(%client, active_clients = state.toasts.client_count(), "signed out");
    state.toasts.notify(&client, ToastKind::Info, "Signed out");
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SessionQuery {
    path: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<Decision>,
}

/// `GET /api/auth/session`: the same presence check the guard uses, plus
/// the guard's answer for `?path=` when given.
pub async fn session(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<SessionQuery>,
) -> Json<SessionResponse> {
    let authenticated = ctx.is_present();
    let decision = query
        .path
        .as_deref()
        .map(|path| decide(&state.guard, path, authenticated));
    Json(SessionResponse { authenticated, decision })
}

#[derive(Serialize)]
pub struct TokenDebugResponse {
    access_token: Option<TokenReport>,
    refresh_token_present: bool,
    user: Option<serde_json::Value>,
}

/// `GET /api/auth/token`: diagnostic view of the stored tokens.
pub async fn token_report(jar: CookieJar, ctx: SessionContext) -> Json<TokenDebugResponse> {
    let now = unix_now_secs();
    Json(TokenDebugResponse {
        access_token: ctx
            .access_token
            .as_deref()
            .map(|token| TokenReport::inspect(token, now)),
        refresh_token_present: ctx.refresh_token.is_some(),
        user: jar
            .get(USER_COOKIE)
            .map(Cookie::value)
            .and_then(session::decode_user),
    })
}

/// `DELETE /api/auth/token`: manual reset from the debug panel.
pub async fn reset_tokens(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, client) = toast_client(jar, &state.config);
    let jar = session::clear_session(jar, &state.config.cookies);
    tracing::info!(%client, "session cookies reset from debug panel");
    state.toasts.notify(&client, ToastKind::Warning, "Tokens cleared");
    (jar, StatusCode::NO_CONTENT)
}

fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
