use anyhow::Result;
use sqlx::PgPool;
use tracing::{error, info};

/// Runs the schema migrations embedded from `../migrations` at compile
/// time. No distributed-lock coordination: this binary drives one sync
/// pass at a time and is not deployed as a multi-replica cluster.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("running database migrations");
    sqlx::migrate!("../migrations").run(pool).await.map_err(|e| {
        error!("failed to run migrations: {e}");
        anyhow::anyhow!("migration failed: {e}")
    })?;
    info!("migrations complete");
    Ok(())
}
