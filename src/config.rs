use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::services::EligibilityPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub prerequisite_policy: EligibilityPolicy,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://registrar.db".to_string());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        let token_ttl_secs = parse_var("TOKEN_TTL_SECS", 3600)?;
        let prerequisite_policy =
            parse_var("PREREQUISITE_POLICY", EligibilityPolicy::default())?;

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            prerequisite_policy,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
