//! Database Connection Pooling
//!
//! Connection pool setup and health checking for the Postgres user store.
//! Settings favor predictable failure over unbounded waits: conservative
//! connection limits and an aggressive acquire timeout so a saturated pool
//! surfaces as an error instead of a hang.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL (from DATABASE_URL env var)
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection from the pool
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    Connection(String),
    #[error("database health check failed: {0}")]
    HealthCheck(String),
    #[error("database query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Create a connection pool and verify it with a health check.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    info!(
        max_connections = config.max_connections,
        "Initializing database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await
        .map_err(|e| DatabaseError::Connection(format!("Failed to connect: {}", e)))?;

    health_check(&pool).await?;

    info!("Database connection pool initialized successfully");

    Ok(pool)
}

/// Verify the pool can execute a query and report its latency.
pub async fn health_check(pool: &PgPool) -> Result<HealthStatus, DatabaseError> {
    let start = std::time::Instant::now();

    let result: (i32,) = sqlx::query_as("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| DatabaseError::HealthCheck(format!("Query failed: {}", e)))?;

    if result.0 != 1 {
        return Err(DatabaseError::HealthCheck("Unexpected query result".into()));
    }

    let status = HealthStatus {
        connected: true,
        latency: start.elapsed(),
        pool_size: pool.size(),
        idle_connections: pool.num_idle() as u32,
    };

    info!(latency_ms = ?status.latency.as_millis(), "Database health check passed");

    Ok(status)
}

/// Database health status
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub connected: bool,
    pub latency: Duration,
    pub pool_size: u32,
    pub idle_connections: u32,
}

impl HealthStatus {
    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.connected && self.latency < Duration::from_secs(5)
    }
}
