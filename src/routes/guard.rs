//! Navigation guard middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::services::guard::{Decision, decide};
use crate::services::session::SessionContext;
use crate::state::AppState;

/// Allow the request or answer with a temporary redirect, per
/// [`decide`]. Paths the policy excludes pass through untouched.
pub async fn route_guard(State(state): State<AppState>, session: SessionContext, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if !state.guard.applies_to(&path) {
        return next.run(req).await;
    }

    let session_present = session.is_present();
    match decide(&state.guard, &path, session_present) {
        Decision::Allow => {
            tracing::debug!(%path, session_present, "guard allow");
            next.run(req).await
        }
        Decision::Redirect(target) => {
            tracing::debug!(%path, session_present, %target, "guard redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
