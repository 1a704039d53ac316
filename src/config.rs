//! Process configuration parsed from environment variables.
//!
//! Every value has a default so the server starts with an empty environment;
//! unparsable values fall back to the default rather than aborting startup.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_STATIC_DIR: &str = "./static";
pub const DEFAULT_TOAST_DURATION_MS: i64 = toasts::DEFAULT_DURATION_MS;
pub const DEFAULT_TOAST_MAX_CLIENTS: usize = 10_000;
pub const DEFAULT_ACCESS_TOKEN_MAX_AGE_SECS: i64 = 86_400;
pub const DEFAULT_REFRESH_TOKEN_MAX_AGE_SECS: i64 = 604_800;
pub const DEFAULT_API_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub access_max_age_secs: i64,
    pub refresh_max_age_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Remote REST API root, without trailing slash.
    pub api_base_url: String,
    pub static_dir: PathBuf,
    pub cookies: CookieSettings,
    pub toast_default_duration_ms: i64,
    /// Toast queues kept at once; the least recently used is evicted beyond this.
    pub toast_max_clients: usize,
    pub api_timeouts: ApiTimeouts,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// - `PORT`: default 3000
    /// - `API_BASE_URL`: remote API root
    /// - `STATIC_DIR`: pre-built dashboard pages
    /// - `COOKIE_SECURE`: inferred from the `API_BASE_URL` scheme when unset
    /// - `TOAST_DEFAULT_DURATION_MS`: default 5000
    /// - `TOAST_MAX_CLIENTS`: default 10000
    /// - `ACCESS_TOKEN_MAX_AGE_SECS` / `REFRESH_TOKEN_MAX_AGE_SECS`
    /// - `API_REQUEST_TIMEOUT_SECS` / `API_CONNECT_TIMEOUT_SECS`
    #[must_use]
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| api_base_url.starts_with("https://"));

        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR)),
            cookies: CookieSettings {
                secure,
                access_max_age_secs: env_parse("ACCESS_TOKEN_MAX_AGE_SECS", DEFAULT_ACCESS_TOKEN_MAX_AGE_SECS),
                refresh_max_age_secs: env_parse("REFRESH_TOKEN_MAX_AGE_SECS", DEFAULT_REFRESH_TOKEN_MAX_AGE_SECS),
            },
            toast_default_duration_ms: env_parse("TOAST_DEFAULT_DURATION_MS", DEFAULT_TOAST_DURATION_MS),
            toast_max_clients: env_parse("TOAST_MAX_CLIENTS", DEFAULT_TOAST_MAX_CLIENTS),
            api_timeouts: ApiTimeouts {
                request: Duration::from_secs(env_parse("API_REQUEST_TIMEOUT_SECS", DEFAULT_API_REQUEST_TIMEOUT_SECS)),
                connect: Duration::from_secs(env_parse("API_CONNECT_TIMEOUT_SECS", DEFAULT_API_CONNECT_TIMEOUT_SECS)),
            },
            api_base_url,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            cookies: CookieSettings {
                secure: false,
                access_max_age_secs: DEFAULT_ACCESS_TOKEN_MAX_AGE_SECS,
                refresh_max_age_secs: DEFAULT_REFRESH_TOKEN_MAX_AGE_SECS,
            },
            toast_default_duration_ms: DEFAULT_TOAST_DURATION_MS,
            toast_max_clients: DEFAULT_TOAST_MAX_CLIENTS,
            api_timeouts: ApiTimeouts {
                request: Duration::from_secs(DEFAULT_API_REQUEST_TIMEOUT_SECS),
                connect: Duration::from_secs(DEFAULT_API_CONNECT_TIMEOUT_SECS),
            },
        }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| parse_bool(&raw))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
