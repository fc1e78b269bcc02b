//! Token-bound verification on GET /auth/extension.

mod common;

use axum::http::StatusCode;
use common::{get_json, test_app, test_state};

#[tokio::test]
async fn test_verify_with_correct_token() {
    let state = test_state();
    let handshake = state.handshake.clone();
    let app = test_app(state).await;
    let (hs_state, _) = handshake.initiate("ext-1".to_string(), None, Some("pre-shared-secret"));

    let (status, body) = get_json(
        &app,
        &format!("/auth/extension?state={}&token=pre-shared-secret", hs_state),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["extensionId"], "ext-1");
}

#[tokio::test]
async fn test_verify_with_wrong_token() {
    let state = test_state();
    let handshake = state.handshake.clone();
    let app = test_app(state).await;
    let (hs_state, _) = handshake.initiate("ext-1".to_string(), None, Some("pre-shared-secret"));

    let (status, body) = get_json(
        &app,
        &format!("/auth/extension?state={}&token=wrong", hs_state),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);
    assert_eq!(body["code"], "token_mismatch");
}

#[tokio::test]
async fn test_verify_unbound_state_accepts_any_token() {
    let state = test_state();
    let handshake = state.handshake.clone();
    let app = test_app(state).await;
    let (hs_state, _) = handshake.initiate("ext-1".to_string(), None, None);

    let (status, body) = get_json(
        &app,
        &format!("/auth/extension?state={}&token=anything", hs_state),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, _) = get_json(&app, &format!("/auth/extension?state={}", hs_state)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_verify_bound_state_without_token_passes() {
    // Binding is opt-in enforcement: a stored hash alone does not make the
    // token mandatory on this endpoint.
    let state = test_state();
    let handshake = state.handshake.clone();
    let app = test_app(state).await;
    let (hs_state, _) = handshake.initiate("ext-1".to_string(), None, Some("pre-shared-secret"));

    let (status, body) = get_json(&app, &format!("/auth/extension?state={}", hs_state)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn test_verify_unknown_state() {
    let app = test_app(test_state()).await;

    let (status, body) = get_json(&app, "/auth/extension?state=missing&token=whatever").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["valid"], false);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_verify_requires_state_parameter() {
    let app = test_app(test_state()).await;

    let (status, body) = get_json(&app, "/auth/extension?token=whatever").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_parameter");
    assert_eq!(body["valid"], false);
}
