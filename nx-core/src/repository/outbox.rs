//! `CloudOutboxEvent` queue persistence. The transport itself is external
//! (Non-goal per spec.md §1); this repository only owns enqueue/drain/ack.

use sqlx::{types::Json, PgPool, Row};

use crate::{models::CloudOutboxEvent, Result};

#[derive(Clone)]
pub struct CloudOutboxRepository {
    pool: PgPool,
}

impl CloudOutboxRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn enqueue(
        &self,
        kind: &str,
        payload: serde_json::Value,
        created_at_ms: i64,
    ) -> Result<CloudOutboxEvent> {
        let row = sqlx::query(
            r"
            INSERT INTO cloud_outbox_events (kind, payload, created_at_ms, attempts)
            VALUES ($1, $2, $3, 0)
            RETURNING id, kind, payload, created_at_ms, attempts
            ",
        )
        .bind(kind)
        .bind(Json(&payload))
        .bind(created_at_ms)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_event(row)
    }

    /// FIFO by `created_at_ms`, oldest first.
    pub async fn drain(&self, limit: i64) -> Result<Vec<CloudOutboxEvent>> {
        let rows = sqlx::query(
            r"
            SELECT id, kind, payload, created_at_ms, attempts
            FROM cloud_outbox_events ORDER BY created_at_ms ASC LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }

    pub async fn ack(&self, ids: &[i64]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cloud_outbox_events WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn record_attempt(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE cloud_outbox_events SET attempts = attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_event(row: sqlx::postgres::PgRow) -> Result<CloudOutboxEvent> {
        let payload: Json<serde_json::Value> = row.try_get("payload")?;
        Ok(CloudOutboxEvent {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            payload: payload.0,
            created_at_ms: row.try_get("created_at_ms")?,
            attempts: row.try_get::<i32, _>("attempts")? as u32,
        })
    }
}
