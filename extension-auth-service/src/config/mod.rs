use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionAuthConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    /// Public base URL of the web site; hand-off and dashboard URLs are
    /// built against it.
    pub base_url: String,
    pub dashboard_path: String,
    pub jwt: JwtConfig,
    pub handshake: HandshakeConfig,
    pub security: SecurityConfig,
    pub swagger: SwaggerConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of the credential handed to the extension. Long-lived by
    /// design: one bearer token per completed handshake, no refresh rotation.
    pub extension_token_expiry_hours: i64,
    pub access_token_expiry_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeConfig {
    /// Maximum age of a pending handshake record. One hour; an earlier
    /// draft of the cleanup policy said one minute, which was never what
    /// ran in production.
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwaggerConfig {
    pub enabled: SwaggerMode,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SwaggerMode {
    Public,
    Authenticated,
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub initiate_attempts: u32,
    pub initiate_window_seconds: u64,
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

impl ExtensionAuthConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = ExtensionAuthConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("extension-auth-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            base_url: get_env("BASE_URL", Some("http://localhost:3000"), is_prod)?,
            dashboard_path: get_env("DASHBOARD_PATH", Some("/dashboard"), is_prod)?,
            jwt: JwtConfig {
                secret: get_env(
                    "AUTH_SECRET",
                    Some("dev-only-secret-change-this-in-prod-1234"),
                    is_prod,
                )?,
                extension_token_expiry_hours: parse_env(
                    "JWT_EXTENSION_TOKEN_EXPIRY_HOURS",
                    Some("720"),
                    is_prod,
                )?,
                access_token_expiry_minutes: parse_env(
                    "JWT_ACCESS_TOKEN_EXPIRY_MINUTES",
                    Some("15"),
                    is_prod,
                )?,
            },
            handshake: HandshakeConfig {
                ttl_seconds: parse_env("HANDSHAKE_TTL_SECONDS", Some("3600"), is_prod)?,
                sweep_interval_seconds: parse_env(
                    "HANDSHAKE_SWEEP_INTERVAL_SECONDS",
                    Some("600"),
                    is_prod,
                )?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("http://localhost:3000"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            swagger: SwaggerConfig {
                enabled: get_env("ENABLE_SWAGGER", Some("public"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            },
            rate_limit: RateLimitConfig {
                initiate_attempts: parse_env("RATE_LIMIT_INITIATE_ATTEMPTS", Some("30"), is_prod)?,
                initiate_window_seconds: parse_env(
                    "RATE_LIMIT_INITIATE_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?,
                login_attempts: parse_env("RATE_LIMIT_LOGIN_ATTEMPTS", Some("5"), is_prod)?,
                login_window_seconds: parse_env(
                    "RATE_LIMIT_LOGIN_WINDOW_SECONDS",
                    Some("900"),
                    is_prod,
                )?,
                global_ip_limit: parse_env("RATE_LIMIT_GLOBAL_IP_LIMIT", Some("100"), is_prod)?,
                global_ip_window_seconds: parse_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.secret.len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AUTH_SECRET must be at least 32 bytes"
            )));
        }

        if self.jwt.extension_token_expiry_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_EXTENSION_TOKEN_EXPIRY_HOURS must be positive"
            )));
        }

        if self.handshake.ttl_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "HANDSHAKE_TTL_SECONDS must be positive"
            )));
        }

        if self.handshake.sweep_interval_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "HANDSHAKE_SWEEP_INTERVAL_SECONDS must be positive"
            )));
        }

        if self.base_url.ends_with('/') {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BASE_URL must not have a trailing slash"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.jwt.secret.starts_with("dev-only-") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "AUTH_SECRET must be set to a real value in production"
                )));
            }

            if self.swagger.enabled == SwaggerMode::Public {
                tracing::error!("Swagger is publicly accessible in production - consider using 'authenticated' or 'disabled'");
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_env<T: std::str::FromStr>(
    key: &str,
    default: Option<&str>,
    is_prod: bool,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    get_env(key, default, is_prod)?.parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} is not valid: {}", key, e))
    })
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for SwaggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(SwaggerMode::Public),
            "authenticated" => Ok(SwaggerMode::Authenticated),
            "disabled" => Ok(SwaggerMode::Disabled),
            _ => Err(format!("Invalid swagger mode: {}", s)),
        }
    }
}
