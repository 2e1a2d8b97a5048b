//! Application Configuration
//!
//! Single entry point for configuring the service. Everything is read from
//! the environment at startup via [`AppConfig::from_env`]; missing optional
//! variables fall back to development-friendly defaults, while the signing
//! secrets and database URL are required and fail startup loudly when
//! absent.
//!
//! # Environment Variables
//!
//! - `PORT`: listen port (default: 3001)
//! - `APP_ENV`: `development`, `test`, or `production` (default: development)
//! - `DATABASE_URL`: Postgres connection string (required)
//! - `JWT_SECRET`: access token signing secret (required)
//! - `JWT_EXPIRES_IN`: access token TTL, e.g. `15m`, `1d` (default: 1d)
//! - `JWT_REFRESH_SECRET`: refresh token signing secret (required)
//! - `JWT_REFRESH_EXPIRES_IN`: refresh token TTL (default: 7d)
//! - `API_PREFIX`: route prefix (default: /api)
//! - `REDIS_URL`: reserved for session caching, optional and currently unread
//! - `BCRYPT_COST`: bcrypt work factor (default: 10)
//! - `RESET_TOKEN_TTL`: password reset token validity (default: 1h)

use std::time::Duration;

use thiserror::Error;

use crate::parse::parse_duration;

/// Secrets shorter than this trigger a warning (or a hard error in
/// production); an HS256 key should carry at least as much entropy as the
/// hash output.
const MIN_SECRET_LEN: usize = 32;

/// Deployment environment, controls error verbosity and secret strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Configuration loading failure. Startup-fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("{0} is too short: signing secrets must be at least 32 characters in production")]
    WeakSecret(&'static str),
}

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub jwt_refresh_secret: String,
    pub jwt_refresh_expires_in: Duration,
    pub api_prefix: String,
    pub bcrypt_cost: u32,
    pub reset_token_ttl: Duration,
    /// Reserved for a future session cache; loaded but not yet consumed.
    pub redis_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::parse(
            &std::env::var("APP_ENV")
                .or_else(|_| std::env::var("ENVIRONMENT"))
                .unwrap_or_else(|_| "development".into()),
        );

        let config = Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),
            environment,
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            jwt_expires_in: duration_var("JWT_EXPIRES_IN", Duration::from_secs(24 * 60 * 60)),
            jwt_refresh_secret: require("JWT_REFRESH_SECRET")?,
            jwt_refresh_expires_in: duration_var(
                "JWT_REFRESH_EXPIRES_IN",
                Duration::from_secs(7 * 24 * 60 * 60),
            ),
            api_prefix: std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".into()),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::hasher::DEFAULT_COST),
            reset_token_ttl: duration_var("RESET_TOKEN_TTL", Duration::from_secs(60 * 60)),
            redis_url: std::env::var("REDIS_URL").ok(),
        };

        config.check_secret("JWT_SECRET", &config.jwt_secret)?;
        config.check_secret("JWT_REFRESH_SECRET", &config.jwt_refresh_secret)?;

        Ok(config)
    }

    /// Enforce minimum secret length in production; warn elsewhere.
    fn check_secret(&self, name: &'static str, secret: &str) -> Result<(), ConfigError> {
        if secret.len() >= MIN_SECRET_LEN {
            return Ok(());
        }
        if self.environment.is_production() {
            return Err(ConfigError::WeakSecret(name));
        }
        tracing::warn!(
            variable = name,
            "signing secret is shorter than {} characters, fine for development only",
            MIN_SECRET_LEN
        );
        Ok(())
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn duration_var(name: &str, default: Duration) -> Duration {
    match std::env::var(name) {
        Ok(value) => parse_duration(&value, default),
        Err(_) => default,
    }
}
