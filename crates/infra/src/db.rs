//! Database adapters: connection pool construction.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

use crate::config::DatabaseConfig;

/// Open a Postgres pool with the configured limits and timeouts.
#[instrument(
    skip_all,
    fields(max_connections = config.max_connections, min_connections = config.min_connections),
    err
)]
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect(&config.url)
        .await?;

    info!("postgres pool ready");
    Ok(pool)
}
