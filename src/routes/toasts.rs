//! Toast routes: the notification queue of the calling browser.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use toasts::{Toast, ToastKind};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::session::{TOAST_CLIENT_COOKIE, generate_client_key, toast_client_cookie};
use crate::state::AppState;

/// Key of the calling browser's toast queue, minting (and setting) a fresh
/// `toast_client` cookie on first contact.
pub(crate) fn toast_client(jar: CookieJar, config: &AppConfig) -> (CookieJar, String) {
    let existing = jar
        .get(TOAST_CLIENT_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned);
    if let Some(key) = existing {
        return (jar, key);
    }

    let key = generate_client_key();
    (jar.add(toast_client_cookie(key.clone(), &config.cookies)), key)
}

#[derive(Deserialize)]
pub struct ShowToastBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub duration: Option<i64>,
}

/// `GET /api/toasts`: active toasts, oldest first.
pub async fn list(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Vec<Toast>>) {
    let (jar, client) = toast_client(jar, &state.config);
    let toasts = state
        .toasts
        .existing(&client)
        .map(|manager| manager.toasts())
        .unwrap_or_default();
    (jar, Json(toasts))
}

/// `POST /api/toasts`: show a toast; `duration <= 0` keeps it until dismissed.
pub async fn show(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<ShowToastBody>,
) -> Result<impl IntoResponse, ApiError> {
    let kind: ToastKind = body
        .kind
        .parse()
        .map_err(|e: toasts::UnknownToastKind| ApiError::Validation(e.to_string()))?;
    if body.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }

    let (jar, client) = toast_client(jar, &state.config);
    let duration = body.duration.unwrap_or(state.toasts.default_duration_ms());
    let id = state.toasts.show(&client, kind, body.message, duration);

    Ok((StatusCode::CREATED, jar, Json(serde_json::json!({ "id": id }))))
}

/// `DELETE /api/toasts/{id}`: dismiss one toast. Unknown ids succeed too.
pub async fn remove(State(state): State<AppState>, jar: CookieJar, Path(id): Path<String>) -> StatusCode {
    let (_, client) = toast_client(jar, &state.config);
    if let Some(manager) = state.toasts.existing(&client) {
        manager.remove(&id);
    }
    StatusCode::NO_CONTENT
}

/// `DELETE /api/toasts`: dismiss everything.
pub async fn clear_all(State(state): State<AppState>, jar: CookieJar) -> StatusCode {
    let (_, client) = toast_client(jar, &state.config);
    if let Some(manager) = state.toasts.existing(&client) {
        manager.clear_all();
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "toasts_test.rs"]
mod tests;
