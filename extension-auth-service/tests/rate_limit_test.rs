//! Per-IP rate limiting on the unauthenticated initiate endpoint.

mod common;

use axum::http::StatusCode;
use common::{post_json, test_app, test_state_with_config};

#[tokio::test]
async fn test_initiate_rate_limit_trips() {
    let mut config = common::test_config();
    config.rate_limit.initiate_attempts = 3;
    config.rate_limit.initiate_window_seconds = 60;
    let app = test_app(test_state_with_config(config)).await;

    for _ in 0..3 {
        let (status, _) = post_json(&app, "/auth/extension", r#"{"extensionId": "ext-1"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = post_json(&app, "/auth/extension", r#"{"extensionId": "ext-1"}"#).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "too_many_requests");
}
