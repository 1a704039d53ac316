//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON endpoints live under `/api`; every other path falls through to the
//! pre-built dashboard pages in `STATIC_DIR`. The navigation guard wraps the
//! whole router (fallback included) and lets excluded prefixes straight
//! through, so API calls answer with JSON errors instead of redirects.

pub mod auth;
pub mod guard;
pub mod toasts;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/token", get(auth::token_report).delete(auth::reset_tokens))
        .route("/api/toasts", get(toasts::list).post(toasts::show).delete(toasts::clear_all))
        .route("/api/toasts/{id}", delete(toasts::remove))
        .route("/healthz", get(healthz))
}

/// Full application: API routes, guarded static pages, request tracing.
pub fn app(state: AppState) -> Router {
    let pages = ServeDir::new(&state.config.static_dir).append_index_html_on_directories(true);

    api_routes()
        .fallback_service(pages)
        .layer(middleware::from_fn_with_state(state.clone(), guard::route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
