//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Connect a pool to the configured database
///
/// Fails with a configuration error when no URL is set.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| DomainError::configuration("database.url is not set"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| DomainError::persistence(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}
