//! Process configuration, read from the environment (and `.env` via `dotenvy` in `main`).

use std::{env, net::SocketAddr};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use utils::password::DEFAULT_COST;

pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes")]
    WeakSecret,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub admin_token_ttl: Duration,
    pub customer_token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub admin_bootstrap: Option<AdminBootstrap>,
    pub sentry_dsn: Option<String>,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let admin_bootstrap = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                password: SecretString::from(password),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: optional("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://construction_portal.db".to_string()),
            host: optional("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed("PORT", 3001)?,
            jwt_secret: SecretString::from(jwt_secret),
            admin_token_ttl: Duration::hours(parsed("ADMIN_TOKEN_TTL_HOURS", 24)?),
            customer_token_ttl: Duration::hours(parsed("CUSTOMER_TOKEN_TTL_HOURS", 168)?),
            bcrypt_cost: parsed("BCRYPT_COST", DEFAULT_COST)?,
            admin_bootstrap,
            sentry_dsn: optional("SENTRY_DSN"),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: raw,
        })
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}
