use extension_auth_service::{
    build_router,
    config::ExtensionAuthConfig,
    services::{
        spawn_sweeper, AuthService, HandshakeService, InMemoryUserStore, JwtService,
        PendingRequestRegistry,
    },
    AppState,
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = ExtensionAuthConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting extension auth service"
    );

    let jwt = JwtService::new(&config.jwt).map_err(service_core::error::AppError::ConfigError)?;
    tracing::info!("JWT service initialized");

    // The registry is owned here and injected; handlers and the sweeper
    // share the same instance through the Arc.
    let registry = Arc::new(PendingRequestRegistry::new());

    let users: Arc<dyn extension_auth_service::services::UserStore> =
        Arc::new(InMemoryUserStore::new());

    let handshake = HandshakeService::new(
        registry.clone(),
        jwt.clone(),
        config.base_url.clone(),
        config.dashboard_path.clone(),
    );
    let auth_service = AuthService::new(users.clone(), jwt.clone());

    let initiate_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.initiate_attempts,
        config.rate_limit.initiate_window_seconds,
    );
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );
    tracing::info!("Rate limiters initialized: Initiate, Login, and Global IP");

    // One task owns both eviction and occupancy logging.
    let sweeper = spawn_sweeper(
        registry.clone(),
        std::time::Duration::from_secs(config.handshake.sweep_interval_seconds),
        chrono::Duration::seconds(config.handshake.ttl_seconds as i64),
    );
    tracing::info!(
        ttl_seconds = config.handshake.ttl_seconds,
        sweep_interval_seconds = config.handshake.sweep_interval_seconds,
        "Expiry sweeper started"
    );

    let state = AppState {
        config: config.clone(),
        jwt,
        registry,
        handshake,
        auth_service,
        users,
        initiate_rate_limiter,
        login_rate_limiter,
        ip_rate_limiter,
    };

    let app = build_router(state).await?;

    let addr = config.common.bind_addr()?;

    let service_span = tracing::info_span!(
        "service",
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
    );
    let _guard = service_span.enter();

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
