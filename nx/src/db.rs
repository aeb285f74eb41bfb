//! Database pool initialization, grounded on the teacher's
//! `synctv-core/src/bootstrap/database.rs` minus its Prometheus pool-gauge
//! task (no metrics surface in scope here).

use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, info};

use nx_core::config::DatabaseConfig;

pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!(database = ?config, "connecting to database");

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect(&config.url)
        .await
        .map_err(|e| {
            error!("failed to connect to database: {e}");
            anyhow::anyhow!("database connection failed: {e}")
        })
}
