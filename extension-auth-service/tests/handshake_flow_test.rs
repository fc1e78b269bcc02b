//! End-to-end handshake: initiate, poll, login-with-bind, poll again, expiry.

mod common;

use axum::http::StatusCode;
use common::{get_json, post_json, test_app, test_state, TEST_EMAIL, TEST_PASSWORD};

#[tokio::test]
async fn test_full_handshake_flow() {
    let state = test_state();
    let registry = state.registry.clone();
    let app = test_app(state).await;

    // 1. Extension initiates
    let (status, body) = post_json(
        &app,
        "/auth/extension",
        r#"{"extensionId": "ext-42", "redirectURL": "https://ext.example/cb"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let handshake_state = body["state"].as_str().unwrap().to_string();
    let auth_url = body["authUrl"].as_str().unwrap();
    assert!(auth_url.starts_with("/extension-auth?state="));
    assert!(auth_url.contains(&handshake_state));

    // 2. Browser polls before login
    let (status, body) = get_json(
        &app,
        &format!("/auth/extension/init?state={}", handshake_state),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["extensionId"], "ext-42");
    assert_eq!(body["redirectURL"], "https://ext.example/cb");

    // 3. Login carries the handshake state
    let (status, body) = post_json(
        &app,
        "/auth/login",
        &format!(
            r#"{{"email": "{}", "password": "{}", "extensionAuthState": "{}"}}"#,
            TEST_EMAIL, TEST_PASSWORD, handshake_state
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["tokens"]["access_token"].as_str().is_some());

    let extension_auth = &body["extensionAuth"];
    let redirect_url = extension_auth["redirectUrl"].as_str().unwrap();
    assert!(redirect_url.contains("/extension-auth-success?token="));
    assert!(redirect_url.contains(&format!("state={}", handshake_state)));
    assert_eq!(extension_auth["userData"]["email"], TEST_EMAIL);
    assert!(extension_auth["token"].as_str().is_some());
    assert!(extension_auth["dashboardUrl"]
        .as_str()
        .unwrap()
        .ends_with("/dashboard"));

    // 4. The record survives the bind; a completion-page reload still works
    let (status, body) = get_json(
        &app,
        &format!("/auth/extension/init?state={}", handshake_state),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    // 5. After the sweeper evicts it, the state is gone for good
    registry.sweep_expired(chrono::Duration::seconds(0));
    let (status, body) = get_json(
        &app,
        &format!("/auth/extension/init?state={}", handshake_state),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["valid"], false);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_initiate_requires_extension_id() {
    let app = test_app(test_state()).await;

    // Absent and empty extensionId are the same missing-parameter 400
    let (status, body) = post_json(&app, "/auth/extension", r#"{}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_parameter");

    let (status, body) = post_json(&app, "/auth/extension", r#"{"extensionId": ""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_parameter");
}

#[tokio::test]
async fn test_poll_requires_state_parameter() {
    let app = test_app(test_state()).await;

    let (status, body) = get_json(&app, "/auth/extension/init").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_parameter");
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_poll_unknown_state_is_not_found() {
    let app = test_app(test_state()).await;

    let (status, body) = get_json(&app, "/auth/extension/init?state=never-existed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["valid"], false);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_poll_responses_are_uncacheable() {
    let state = test_state();
    let handshake = state.handshake.clone();
    let app = test_app(state).await;
    let (hs_state, _) = handshake.initiate("ext-1".to_string(), None, None);

    let response = common::get(&app, &format!("/auth/extension/init?state={}", hs_state)).await;
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store, max-age=0"
    );

    let response = common::get(&app, "/auth/extension/init?state=missing").await;
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store, max-age=0"
    );
}

#[tokio::test]
async fn test_login_without_handshake_state_is_plain_login() {
    let app = test_app(test_state()).await;

    let (status, body) = post_json(
        &app,
        "/auth/login",
        &format!(
            r#"{{"email": "{}", "password": "{}"}}"#,
            TEST_EMAIL, TEST_PASSWORD
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("extensionAuth").is_none());
}

#[tokio::test]
async fn test_login_with_unknown_handshake_state() {
    let app = test_app(test_state()).await;

    let (status, body) = post_json(
        &app,
        "/auth/login",
        &format!(
            r#"{{"email": "{}", "password": "{}", "extensionAuthState": "stale-state"}}"#,
            TEST_EMAIL, TEST_PASSWORD
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = test_app(test_state()).await;

    let (status, body) = post_json(
        &app,
        "/auth/login",
        &format!(
            r#"{{"email": "{}", "password": "wrong"}}"#,
            TEST_EMAIL
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_login_redirect_override_wins() {
    let state = test_state();
    let handshake = state.handshake.clone();
    let app = test_app(state).await;
    let (hs_state, _) = handshake.initiate(
        "ext-1".to_string(),
        Some("https://stored.example/cb".to_string()),
        None,
    );

    let (status, body) = post_json(
        &app,
        "/auth/login",
        &format!(
            r#"{{"email": "{}", "password": "{}", "extensionAuthState": "{}", "extensionRedirectUri": "https://override.example/cb"}}"#,
            TEST_EMAIL, TEST_PASSWORD, hs_state
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let redirect_url = body["extensionAuth"]["redirectUrl"].as_str().unwrap();
    assert!(redirect_url.contains("override.example"));
    assert!(!redirect_url.contains("stored.example"));
}
