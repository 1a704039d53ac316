mod config;
mod error;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::notify::{TokioScheduler, ToastHub};
use services::upstream::HttpAuthApi;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env();
    let port = config.port;

    let auth_api = match HttpAuthApi::new(config.api_base_url.clone(), config.api_timeouts) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, api = %config.api_base_url, "remote api client init failed");
            std::process::exit(1);
        }
    };
    let toasts = ToastHub::new(Arc::new(TokioScheduler), config.toast_default_duration_ms)
        .with_max_clients(config.toast_max_clients);
    tracing::info!(api = %config.api_base_url, static_dir = %config.static_dir.display(), "adminboard configured");

    let state = state::AppState::new(config, Arc::new(auth_api), toasts.clone());

    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, "adminboard listening");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    toasts.shutdown();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed");
    }
}
