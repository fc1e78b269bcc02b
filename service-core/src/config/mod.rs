use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

/// Listener settings shared by every service binary. Service-specific
/// configuration layers on top of this in each service's own config module.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load from an optional `configuration` file plus `APP__`-prefixed
    /// environment variables (`APP__HOST`, `APP__PORT`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Socket address to bind, from the configured host and port.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "APP__HOST '{}' is not a valid IP address: {}",
                self.host,
                e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
