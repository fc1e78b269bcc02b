//! Shared setup for extension-auth-service integration tests.

#![allow(dead_code)]

use extension_auth_service::{
    build_router,
    config::{
        Environment, ExtensionAuthConfig, HandshakeConfig, JwtConfig, RateLimitConfig,
        SecurityConfig, SwaggerConfig, SwaggerMode,
    },
    models::User,
    services::{
        AuthService, HandshakeService, InMemoryUserStore, JwtService, PendingRequestRegistry,
        UserStore,
    },
    utils::{hash_password, Password},
    AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_PASSWORD: &str = "test_password_123";
pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret-123";

pub fn test_config() -> ExtensionAuthConfig {
    ExtensionAuthConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        environment: Environment::Dev,
        service_name: "extension-auth-service".to_string(),
        service_version: "0.0.0-test".to_string(),
        log_level: "error".to_string(),
        base_url: "http://localhost:3000".to_string(),
        dashboard_path: "/dashboard".to_string(),
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            extension_token_expiry_hours: 720,
            access_token_expiry_minutes: 15,
        },
        handshake: HandshakeConfig {
            ttl_seconds: 3600,
            sweep_interval_seconds: 600,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
        rate_limit: RateLimitConfig {
            initiate_attempts: 1000,
            initiate_window_seconds: 60,
            login_attempts: 1000,
            login_window_seconds: 60,
            global_ip_limit: 10000,
            global_ip_window_seconds: 60,
        },
    }
}

/// Build an AppState with an isolated registry and one seeded user.
pub fn test_state() -> AppState {
    test_state_with_config(test_config())
}

pub fn test_state_with_config(config: ExtensionAuthConfig) -> AppState {
    let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");
    let registry = Arc::new(PendingRequestRegistry::new());

    let store = Arc::new(InMemoryUserStore::new());
    let password_hash = hash_password(&Password::new(TEST_PASSWORD.to_string()))
        .expect("Failed to hash test password");
    store.insert(User::new(
        TEST_EMAIL.to_string(),
        Some("Test User".to_string()),
        password_hash.into_string(),
    ));
    let users: Arc<dyn UserStore> = store;

    let handshake = HandshakeService::new(
        registry.clone(),
        jwt.clone(),
        config.base_url.clone(),
        config.dashboard_path.clone(),
    );
    let auth_service = AuthService::new(users.clone(), jwt.clone());

    AppState {
        config: config.clone(),
        jwt,
        registry,
        handshake,
        auth_service,
        users,
        initiate_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.initiate_attempts,
            config.rate_limit.initiate_window_seconds,
        ),
        login_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
        ip_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        ),
    }
}

pub async fn test_app(state: AppState) -> Router {
    build_router(state).await.expect("Failed to build router")
}

fn with_connect_info(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.extension(axum::extract::ConnectInfo(SocketAddr::from((
        [127, 0, 0, 1],
        8080,
    ))))
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            with_connect_info(Request::builder().method("POST").uri(uri))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> axum::http::Response<axum::body::Body> {
    app.clone()
        .oneshot(
            with_connect_info(Request::builder().method("GET").uri(uri))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = get(app, uri).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn body_string(response: axum::http::Response<axum::body::Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
