use super::*;

// =============================================================================
// ErrorCategory::from_status
// =============================================================================

#[test]
fn unauthorized_maps_to_authorization_required() {
    let category = ErrorCategory::from_status(401);
    assert_eq!(category, ErrorCategory::Unauthorized);
    assert_eq!(category.message(), "authorization required");
}

#[test]
fn unprocessable_maps_to_validation_error() {
    let category = ErrorCategory::from_status(422);
    assert_eq!(category, ErrorCategory::Validation);
    assert_eq!(category.message(), "validation error");
}

#[test]
fn server_statuses_map_to_server_error() {
    for status in [500, 502, 503, 599] {
        assert_eq!(ErrorCategory::from_status(status), ErrorCategory::Server, "status {status}");
    }
    assert_eq!(ErrorCategory::Server.message(), "server error");
}

#[test]
fn remaining_table_entries() {
    assert_eq!(ErrorCategory::from_status(400), ErrorCategory::BadRequest);
    assert_eq!(ErrorCategory::from_status(403), ErrorCategory::Forbidden);
    assert_eq!(ErrorCategory::from_status(404), ErrorCategory::NotFound);
    assert_eq!(ErrorCategory::from_status(409), ErrorCategory::Conflict);
    assert_eq!(ErrorCategory::from_status(429), ErrorCategory::RateLimited);
}

#[test]
fn unlisted_status_is_unexpected() {
    for status in [200, 302, 418, 600] {
        assert_eq!(ErrorCategory::from_status(status), ErrorCategory::Unexpected, "status {status}");
    }
}

#[test]
fn category_code_matches_serde_name() {
    for category in [ErrorCategory::RateLimited, ErrorCategory::BadRequest, ErrorCategory::Server] {
        let json = serde_json::to_value(category).unwrap();
        assert_eq!(json, category.code());
    }
}

// =============================================================================
// ApiError
// =============================================================================

#[test]
fn upstream_error_keeps_remote_status() {
    let err = ApiError::Upstream { status: 422, detail: None };
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(err.user_message(), "validation error");
}

#[test]
fn upstream_success_status_becomes_bad_gateway() {
    let err = ApiError::Upstream { status: 204, detail: None };
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn upstream_detail_overrides_category_message() {
    let err = ApiError::Upstream { status: 401, detail: Some("Incorrect username or password".into()) };
    assert_eq!(err.user_message(), "Incorrect username or password");
}

#[test]
fn unavailable_is_bad_gateway_server_category() {
    let err = ApiError::UpstreamUnavailable("connection refused".into());
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(err.category(), ErrorCategory::Server);
    assert_eq!(err.user_message(), "server error");
}

#[test]
fn unauthorized_error_message() {
    let err = ApiError::Unauthorized;
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.user_message(), "authorization required");
}

#[tokio::test]
async fn into_response_writes_json_body() {
    let response = ApiError::Validation("message must not be empty".into()).into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["message"], "message must not be empty");
}

#[test]
fn internal_error_display_carries_cause() {
    let err = ApiError::Internal("http client build failed: no tls backend".into());
    assert_eq!(err.to_string(), "internal error: http client build failed: no tls backend");
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
