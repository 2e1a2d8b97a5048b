//! # Portcullis
//!
//! A token-based authentication backend for Axum applications backed by
//! PostgreSQL.
//!
//! This crate implements the full account lifecycle: registration with
//! bcrypt-hashed credentials, login with an indistinguishable error surface,
//! stateless access/refresh token pairs, and a single-use, expiring password
//! reset flow.
//!
//! ## Features
//!
//! - **Registration**: unique-email accounts with a default profile row
//! - **Login**: bcrypt verification with timing-equalized unknown-email path
//! - **Tokens**: HS256 access/refresh pairs signed with independent secrets
//! - **Password Reset**: CSPRNG tokens, stored expiry, single use
//! - **Security Logging**: structured audit events via `tracing`
//! - **Safe Errors**: internal details logged, never exposed to clients
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use portcullis::{
//!     build_router, create_pool, AccountService, AppConfig, AppState,
//!     DatabaseConfig, PasswordHasher, PgUserDirectory, TokenService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pool = create_pool(&DatabaseConfig::new(&config.database_url)).await?;
//!
//!     let tokens = Arc::new(TokenService::new(
//!         &config.jwt_secret,
//!         &config.jwt_refresh_secret,
//!         config.jwt_expires_in,
//!         config.jwt_refresh_expires_in,
//!     ));
//!     let service = Arc::new(AccountService::new(
//!         Arc::new(PgUserDirectory::new(pool)),
//!         PasswordHasher::new(config.bcrypt_cost),
//!         tokens.clone(),
//!         config.reset_token_ttl,
//!     ));
//!
//!     let app = build_router(
//!         AppState { service, tokens, environment: config.environment },
//!         &config.api_prefix,
//!     );
//!     // Serve with axum::serve...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod database;
pub mod directory;
pub mod error;
pub mod events;
pub mod handlers;
pub mod hasher;
mod parse;
pub mod password;
pub mod reset;
pub mod routes;
pub mod service;
pub mod testing;
pub mod token;
pub mod validation;

// Re-exports
pub use config::{AppConfig, ConfigError, Environment};
pub use crypto::{constant_time_eq, constant_time_str_eq};
pub use database::{create_pool, health_check, DatabaseConfig, DatabaseError, HealthStatus};
pub use directory::{NewUser, PgUserDirectory, PublicUser, UserDirectory, UserRecord};
pub use error::{AppError, ErrorConfig, ErrorKind};
pub use events::{SecurityEvent, Severity};
pub use handlers::{AppState, AuthUser};
pub use hasher::PasswordHasher;
pub use parse::parse_duration;
pub use password::{PasswordError, PasswordPolicy};
pub use reset::ResetToken;
pub use routes::build_router;
pub use service::{AccountService, AuthError, AuthenticatedUser, Registration, TokenPair};
pub use token::{TokenClaims, TokenError, TokenService, TokenType};
