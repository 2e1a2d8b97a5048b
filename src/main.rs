//! Authentication service entry point.
//!
//! Loads configuration from the environment, connects to Postgres, and
//! serves the auth API. See the crate docs for the endpoint list.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use portcullis::{
    build_router, create_pool, error, AccountService, AppConfig, AppState, DatabaseConfig,
    PasswordHasher, PgUserDirectory, TokenService,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portcullis=info".parse()?),
        )
        .init();

    info!("Starting authentication service");

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Error responses show internal detail in development only
    if config.environment.is_production() {
        error::init(error::ErrorConfig::production());
    } else {
        error::init(error::ErrorConfig::development());
    }

    let pool = create_pool(&DatabaseConfig::new(&config.database_url))
        .await
        .context("Failed to create database pool")?;

    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        &config.jwt_refresh_secret,
        config.jwt_expires_in,
        config.jwt_refresh_expires_in,
    ));

    let service = Arc::new(AccountService::new(
        Arc::new(PgUserDirectory::new(pool)),
        PasswordHasher::new(config.bcrypt_cost),
        tokens.clone(),
        config.reset_token_ttl,
    ));

    let state = AppState {
        service,
        tokens,
        environment: config.environment,
    };

    let app = build_router(state, &config.api_prefix);

    let addr = format!("0.0.0.0:{}", config.port);
    info!(environment = ?config.environment, "Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
