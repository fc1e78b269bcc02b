pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    rate_limit::ip_rate_limit_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ExtensionAuthConfig;
use crate::services::{
    AuthService, HandshakeService, JwtService, PendingRequestRegistry, UserStore,
};
use service_core::error::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::handshake::initiate,
        handlers::handshake::poll,
        handlers::handshake::verify,
        handlers::session::login,
        handlers::bridge::extension_auth_success,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::handshake::InitiateRequest,
            dtos::handshake::InitiateResponse,
            dtos::handshake::StatusResponse,
            dtos::handshake::InvalidStateResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            models::SanitizedUser,
            models::UserRole,
            services::TokenResponse,
            services::HandoffRedirect,
        )
    ),
    tags(
        (name = "Extension Handshake", description = "Browser-extension authentication handshake"),
        (name = "Authentication", description = "User authentication and session tokens"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ExtensionAuthConfig,
    pub jwt: JwtService,
    pub registry: Arc<PendingRequestRegistry>,
    pub handshake: HandshakeService,
    pub auth_service: AuthService,
    pub users: Arc<dyn UserStore>,
    pub initiate_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub login_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub ip_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Initiate is extension-driven and unauthenticated, so it gets its own
    // tighter per-IP budget than the global limiter.
    let initiate_limiter = state.initiate_rate_limiter.clone();
    let initiate_route = Router::new()
        .route("/auth/extension", post(handlers::handshake::initiate))
        .layer(from_fn_with_state(
            initiate_limiter,
            ip_rate_limit_middleware,
        ));

    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login", post(handlers::session::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    let ip_limiter = state.ip_rate_limiter.clone();

    let mut app = Router::new().route("/health", get(health_check));

    let swagger_enabled = match state.config.environment {
        config::Environment::Dev => true,
        config::Environment::Prod => match state.config.swagger.enabled {
            config::SwaggerMode::Public | config::SwaggerMode::Authenticated => true,
            config::SwaggerMode::Disabled => false,
        },
    };

    if swagger_enabled {
        app =
            app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        // Keep the OpenAPI JSON available for programmatic access
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        );
    }

    let allowed_origins: Vec<HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(origin = %o, error = %e, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    let app = app
        .route("/auth/extension", get(handlers::handshake::verify))
        .route("/auth/extension/init", get(handlers::handshake::poll))
        .route(
            "/extension-auth-success",
            get(handlers::bridge::extension_auth_success),
        )
        .merge(initiate_route)
        .merge(login_route)
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        );

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "active_handshakes": state.registry.len(),
    }))
}
