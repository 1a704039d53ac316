//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers and middleware via the `State`
//! extractor. It holds the immutable config, the guard policy, the remote
//! auth API client, and the toast hub. Nothing in here is a global.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::guard::GuardPolicy;
use crate::services::notify::ToastHub;
use crate::services::upstream::AuthApi;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub guard: Arc<GuardPolicy>,
    pub auth_api: Arc<dyn AuthApi>,
    pub toasts: ToastHub,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, auth_api: Arc<dyn AuthApi>, toasts: ToastHub) -> Self {
        Self { config: Arc::new(config), guard: Arc::new(GuardPolicy::default()), auth_api, toasts }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
