//! Navigation guard: pure routing decision from (path, session present).
//!
//! DESIGN
//! ======
//! The guard never reads cookies itself. The middleware in `routes::guard`
//! builds a [`SessionContext`](super::session::SessionContext) for the
//! request and hands the boolean in, so [`decide`] is a total function that
//! can be tested without a request.
//!
//! TRADE-OFFS
//! ==========
//! Only the *presence* of `access_token` is checked. An expired token still
//! gets through; the remote API rejects it on the next data call.

use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_ROOT: &str = "/dashboard";
pub const SITE_ROOT: &str = "/";

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// Fixed path sets the guard matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Reachable without a session; bounced to the dashboard with one.
    pub public_paths: Vec<String>,
    pub login_path: String,
    pub dashboard_root: String,
    /// Path prefixes the guard never sees (API, static assets, favicon, probes).
    pub excluded: Vec<String>,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            public_paths: vec![LOGIN_PATH.to_owned()],
            login_path: LOGIN_PATH.to_owned(),
            dashboard_root: DASHBOARD_ROOT.to_owned(),
            excluded: ["/api", "/static", "/favicon.ico", "/healthz"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl GuardPolicy {
    /// `false` for paths in the exclusion list: the exact path or anything
    /// below it (`/api`, `/api/...`, but not `/apiary`).
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        !self.excluded.iter().any(|prefix| under_prefix(path, prefix))
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Evaluate the guard rules in precedence order; first match wins.
///
/// 1. public path, session present → dashboard root
/// 2. public path, no session → allow
/// 3. site root → dashboard root with a session, login without
/// 4. no session → login
/// 5. otherwise → allow
#[must_use]
pub fn decide(policy: &GuardPolicy, path: &str, session_present: bool) -> Decision {
    if policy.is_public(path) {
        return if session_present {
            Decision::Redirect(policy.dashboard_root.clone())
        } else {
            Decision::Allow
        };
    }

    if path == SITE_ROOT {
        let target = if session_present { &policy.dashboard_root } else { &policy.login_path };
        return Decision::Redirect(target.clone());
    }

    if !session_present {
        return Decision::Redirect(policy.login_path.clone());
    }

    Decision::Allow
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
