use super::*;
use std::sync::Arc;

use crate::state::test_helpers::test_app_state;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use tower::ServiceExt;

async fn send(router: Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    router
        .oneshot(req.body(Body::empty()).expect("request should build"))
        .await
        .expect("router is infallible")
}

/// App serving pages from a fresh directory holding one dashboard file.
fn app_with_pages(name: &str) -> Router {
    let dir = std::env::temp_dir().join(format!("adminboard-pages-{name}-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("dashboard")).expect("create page dir");
    std::fs::write(dir.join("dashboard").join("report.txt"), "quarterly").expect("write page");

    let (mut state, _) = test_app_state();
    state.config = Arc::new(crate::config::AppConfig { static_dir: dir, ..(*state.config).clone() });
    app(state)
}

#[tokio::test]
async fn healthz_is_ok_without_session() {
    let (state, _) = test_app_state();
    let response = send(app(state), "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn root_redirects_anonymous_to_login() {
    let (state, _) = test_app_state();
    let response = send(app(state), "/", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn login_redirects_signed_in_to_dashboard() {
    let (state, _) = test_app_state();
    let response = send(app(state), "/login", Some("access_token=abc")).await;
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn api_answers_json_instead_of_redirecting() {
    let (state, _) = test_app_state();
    let response = send(app(state), "/api/toasts", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn protected_page_is_served_with_session() {
    let response = send(app_with_pages("served"), "/dashboard/report.txt", Some("access_token=abc")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&body[..], b"quarterly");
}

#[tokio::test]
async fn protected_page_redirects_without_session() {
    let response = send(app_with_pages("guarded"), "/dashboard/report.txt", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn missing_page_is_not_found_for_signed_in_user() {
    let (state, _) = test_app_state();
    let response = send(app(state), "/dashboard/nowhere", Some("access_token=abc")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
